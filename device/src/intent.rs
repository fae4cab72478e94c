use bincode::{Decode, Encode};

/// The routing role the device assigns to a node.
///
/// This is the UltraScale-era vocabulary; older families use a different set
/// and are not modelled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Encode, Decode)]
pub enum IntentCode {
    Default,
    Output,
    Dedicated,
    GlobalVdistr,
    GlobalHroute,
    GlobalHdistr,
    GlobalVroute,
    GlobalLeaf,
    GlobalBufg,
    Pinfeed,
    Pinbounce,
    Local,
    Hlong,
    Vlong,
    Single,
    Double,
    Hquad,
    Vquad,
    Optdelay,
    LagunaData,
    LagunaOutput,
    CleOutput,
    IntInterface,
}

impl IntentCode {
    pub const ALL: [IntentCode; 23] = [
        IntentCode::Default,
        IntentCode::Output,
        IntentCode::Dedicated,
        IntentCode::GlobalVdistr,
        IntentCode::GlobalHroute,
        IntentCode::GlobalHdistr,
        IntentCode::GlobalVroute,
        IntentCode::GlobalLeaf,
        IntentCode::GlobalBufg,
        IntentCode::Pinfeed,
        IntentCode::Pinbounce,
        IntentCode::Local,
        IntentCode::Hlong,
        IntentCode::Vlong,
        IntentCode::Single,
        IntentCode::Double,
        IntentCode::Hquad,
        IntentCode::Vquad,
        IntentCode::Optdelay,
        IntentCode::LagunaData,
        IntentCode::LagunaOutput,
        IntentCode::CleOutput,
        IntentCode::IntInterface,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntentCode::Default => "INTENT_DEFAULT",
            IntentCode::Output => "NODE_OUTPUT",
            IntentCode::Dedicated => "NODE_DEDICATED",
            IntentCode::GlobalVdistr => "NODE_GLOBAL_VDISTR",
            IntentCode::GlobalHroute => "NODE_GLOBAL_HROUTE",
            IntentCode::GlobalHdistr => "NODE_GLOBAL_HDISTR",
            IntentCode::GlobalVroute => "NODE_GLOBAL_VROUTE",
            IntentCode::GlobalLeaf => "NODE_GLOBAL_LEAF",
            IntentCode::GlobalBufg => "NODE_GLOBAL_BUFG",
            IntentCode::Pinfeed => "NODE_PINFEED",
            IntentCode::Pinbounce => "NODE_PINBOUNCE",
            IntentCode::Local => "NODE_LOCAL",
            IntentCode::Hlong => "NODE_HLONG",
            IntentCode::Vlong => "NODE_VLONG",
            IntentCode::Single => "NODE_SINGLE",
            IntentCode::Double => "NODE_DOUBLE",
            IntentCode::Hquad => "NODE_HQUAD",
            IntentCode::Vquad => "NODE_VQUAD",
            IntentCode::Optdelay => "NODE_OPTDELAY",
            IntentCode::LagunaData => "NODE_LAGUNA_DATA",
            IntentCode::LagunaOutput => "NODE_LAGUNA_OUTPUT",
            IntentCode::CleOutput => "NODE_CLE_OUTPUT",
            IntentCode::IntInterface => "NODE_INT_INTERFACE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ic| ic.name() == name)
    }

    /// Global clock distribution family (`NODE_GLOBAL_*`).
    pub fn is_global(self) -> bool {
        matches!(
            self,
            IntentCode::GlobalVdistr
                | IntentCode::GlobalHroute
                | IntentCode::GlobalHdistr
                | IntentCode::GlobalVroute
                | IntentCode::GlobalLeaf
                | IntentCode::GlobalBufg
        )
    }
}

impl std::fmt::Display for IntentCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::IntentCode;

    #[test]
    fn test_names() {
        for ic in IntentCode::ALL {
            assert_eq!(IntentCode::from_name(ic.name()), Some(ic));
            assert_eq!(ic.is_global(), ic.name().starts_with("NODE_GLOBAL"));
        }
        assert_eq!(IntentCode::from_name("NODE_MEOW"), None);
    }
}
