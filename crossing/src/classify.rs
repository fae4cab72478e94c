//! Which routing nodes count as boundary crossings.

use std::fmt::{self, Display, Formatter};

use floorstat_device::{Fabric, IntentCode, NodeId};

/// Intent codes that are known to occur on UltraScale+ inter-region
/// boundaries.  Anything else means the device data does not look like what
/// the counting method was validated against.
pub const INTENTS_CONSIDERED: [IntentCode; 14] = [
    IntentCode::Default,
    IntentCode::Hlong,
    IntentCode::Vlong,
    IntentCode::Single,
    IntentCode::Double,
    IntentCode::Hquad,
    IntentCode::Vquad,
    IntentCode::Local,
    IntentCode::Pinbounce,
    IntentCode::LagunaData,
    IntentCode::GlobalVdistr,
    IntentCode::GlobalVroute,
    IntentCode::GlobalHdistr,
    IntentCode::GlobalHroute,
];

/// `INTENT_DEFAULT` wires allowed on a boundary: clock outputs, block RAM
/// cascades, HPIO and the tie-off nets.
const DEFAULT_WIRE_PREFIXES: [&str; 5] = ["CLKOUT", "BRAM", "HPIO", "GND", "VCC"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeClass {
    Countable,
    ExcludedGlobalClock,
    ExcludedDefaultBoundary,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum IntentViolation {
    Unrecognized,
    NonClockGlobal,
    UnexpectedDefault,
    DspCascade,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnexpectedIntentCode {
    pub node: NodeId,
    pub wire: String,
    pub intent: IntentCode,
    pub violation: IntentViolation,
}

impl Display for UnexpectedIntentCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let what = match self.violation {
            IntentViolation::Unrecognized => "unexpected intent code",
            IntentViolation::NonClockGlobal => "global node is not a clock node",
            IntentViolation::UnexpectedDefault => "unexpected INTENT_DEFAULT node",
            IntentViolation::DspCascade => "unexpected DSP cascade node",
        };
        write!(
            f,
            "{what}: {node:?} `{wire}` ({intent})",
            node = self.node,
            wire = self.wire,
            intent = self.intent
        )
    }
}

impl std::error::Error for UnexpectedIntentCode {}

pub fn classify(fabric: &impl Fabric, node: NodeId) -> Result<NodeClass, UnexpectedIntentCode> {
    let intent = fabric.intent(node);
    let wire = fabric.wire_name(node);
    let fail = |violation| UnexpectedIntentCode {
        node,
        wire: wire.to_string(),
        intent,
        violation,
    };
    if !INTENTS_CONSIDERED.contains(&intent) {
        return Err(fail(IntentViolation::Unrecognized));
    }
    if intent.is_global() {
        if !wire.starts_with("CLK") {
            return Err(fail(IntentViolation::NonClockGlobal));
        }
        return Ok(NodeClass::ExcludedGlobalClock);
    }
    if intent == IntentCode::Default {
        if !DEFAULT_WIRE_PREFIXES.iter().any(|p| wire.starts_with(p)) {
            return Err(fail(IntentViolation::UnexpectedDefault));
        }
        return Ok(NodeClass::ExcludedDefaultBoundary);
    }
    // DSP cascades never show up as PIP endpoints; seeing one means the
    // enumeration is missing connectivity.
    if wire.contains("DSP_") {
        return Err(fail(IntentViolation::DspCascade));
    }
    Ok(NodeClass::Countable)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use floorstat_device::builder::DeviceBuilder;

    use super::*;

    #[test]
    fn test_classify() {
        let mut b = DeviceBuilder::new("xctest", 1, 1);
        let cases = [
            ("EE2_E_BEG3", IntentCode::Double, Ok(NodeClass::Countable)),
            ("WW12_BEG0", IntentCode::Hlong, Ok(NodeClass::Countable)),
            ("LAG_MUX_ATOM_0_TXOUT", IntentCode::LagunaData, Ok(NodeClass::Countable)),
            ("CLK_VDISTR_TOP3", IntentCode::GlobalVdistr, Ok(NodeClass::ExcludedGlobalClock)),
            ("CLK_HROUTE_0", IntentCode::GlobalHroute, Ok(NodeClass::ExcludedGlobalClock)),
            ("CLKOUT_NORTH0", IntentCode::Default, Ok(NodeClass::ExcludedDefaultBoundary)),
            ("BRAM_CASCOUT_ADDRARDADDRU0", IntentCode::Default, Ok(NodeClass::ExcludedDefaultBoundary)),
            ("VCC_WIRE", IntentCode::Default, Ok(NodeClass::ExcludedDefaultBoundary)),
            ("GCLK_B_0", IntentCode::GlobalHdistr, Err(IntentViolation::NonClockGlobal)),
            ("CLE_CLE_L_SITE_0_A_O", IntentCode::Default, Err(IntentViolation::UnexpectedDefault)),
            ("DSP_ACOUT0", IntentCode::Single, Err(IntentViolation::DspCascade)),
            ("IMUX_E10", IntentCode::Pinfeed, Err(IntentViolation::Unrecognized)),
            ("CLK_LEAF_SITES_0_CLK", IntentCode::GlobalLeaf, Err(IntentViolation::Unrecognized)),
        ];
        let nodes: Vec<_> = cases
            .iter()
            .map(|&(wire, intent, _)| b.add_node(wire, intent))
            .collect();
        let dev = b.finish();
        for (node, (wire, _, expected)) in nodes.into_iter().zip(cases) {
            match expected {
                Ok(class) => assert_eq!(classify(&dev, node), Ok(class), "{wire}"),
                Err(violation) => {
                    let err = classify(&dev, node).unwrap_err();
                    assert_eq!(err.violation, violation, "{wire}");
                    assert_eq!(err.wire, wire);
                }
            }
        }
    }

    #[test]
    fn test_every_intent_is_decided() {
        let mut b = DeviceBuilder::new("xctest", 1, 1);
        let nodes: Vec<_> = IntentCode::ALL
            .iter()
            .map(|&ic| (ic, b.add_node("INT_NODE_SDQ_0_INT_OUT0", ic)))
            .collect();
        let dev = b.finish();
        for (ic, node) in nodes {
            let res = classify(&dev, node);
            if INTENTS_CONSIDERED.contains(&ic) {
                assert!(ic.is_global() || ic == IntentCode::Default || res.is_ok());
            } else {
                assert_matches!(
                    res,
                    Err(UnexpectedIntentCode {
                        violation: IntentViolation::Unrecognized,
                        ..
                    })
                );
            }
        }
    }
}
