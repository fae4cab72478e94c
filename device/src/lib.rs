//! The device graph and placed design, as far as the floorplan analyses need
//! them.
//!
//! The analyses only ever talk to the [`Fabric`] and [`PlacedDesign`] traits;
//! [`Device`] and [`Design`] are the in-memory snapshots the tools load from
//! disk.

/// `entity_id!` only derives serde; give the ids a transparent bincode
/// encoding of their inner integer, as `#[derive(Encode, Decode)]` would.
macro_rules! entity_id_bincode {
    ($($id:ident),* $(,)?) => {$(
        impl bincode::Encode for $id {
            fn encode<E: bincode::enc::Encoder>(
                &self,
                encoder: &mut E,
            ) -> Result<(), bincode::error::EncodeError> {
                bincode::Encode::encode(&self.0, encoder)
            }
        }
        impl<Context> bincode::Decode<Context> for $id {
            fn decode<D: bincode::de::Decoder<Context = Context>>(
                decoder: &mut D,
            ) -> Result<Self, bincode::error::DecodeError> {
                Ok(Self(bincode::Decode::decode(decoder)?))
            }
        }
        bincode::impl_borrow_decode!($id);
    )*};
}

pub mod builder;
pub mod design;
pub mod device;
pub mod intent;
pub mod range;

pub use design::{Cell, Design, SiteInst, SiteInstId};
pub use device::{ClockRegion, Device, NodeId, Pip, Site, SiteId, SiteType, Tile, TileId};
pub use intent::IntentCode;
pub use range::{RangeError, RangeKind, TileRange};

/// Read-only view of the routing graph.
pub trait Fabric {
    /// Number of clock region columns and rows.
    fn clock_region_shape(&self) -> (usize, usize);

    /// All tiles covered by a range.
    fn range_tiles(&self, range: &TileRange) -> Result<Vec<TileId>, RangeError>;

    /// Start and end nodes of every PIP in a tile.
    fn pip_endpoints(&self, tile: TileId)
    -> impl Iterator<Item = (Option<NodeId>, Option<NodeId>)> + '_;

    fn wire_name(&self, node: NodeId) -> &str;

    fn intent(&self, node: NodeId) -> IntentCode;
}

/// Read-only view of a placed design on top of its fabric.
pub trait PlacedDesign {
    type Fabric: Fabric;

    fn fabric(&self) -> &Self::Fabric;

    fn constraint_lines(&self) -> impl Iterator<Item = &str> + '_;

    fn site_insts(&self) -> impl Iterator<Item = &SiteInst> + '_;

    fn site(&self, site: SiteId) -> &Site;
}
