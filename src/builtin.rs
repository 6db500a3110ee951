//! Built-in MT7xx schemas and the documentary-credit flow graph.
//!
//! This is the default [`SchemaSource`]; a deployment backed by a database
//! or config loader supplies its own implementation of the trait instead.

use crate::flow::DependencyEdge;
use crate::schema::{Condition, FieldDefinition, MessageTypeSchema, SchemaSource};

const VERSION: &str = "SR2023";

pub struct BuiltinSource;

impl SchemaSource for BuiltinSource {
    fn load(&self) -> anyhow::Result<Vec<MessageTypeSchema>> {
        Ok(vec![
            mt700(),
            mt701(),
            mt705(),
            mt707(),
            mt710(),
            mt720(),
            mt730(),
            mt732(),
            mt734(),
            mt740(),
            mt742(),
            mt747(),
            mt750(),
            mt752(),
            mt754(),
            mt756(),
        ])
    }
}

fn either_41() -> Condition {
    Condition::EitherOr {
        members: vec!["41A".into(), "41D".into()],
    }
}

/// MT700 — Issue of a Documentary Credit.
fn mt700() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "700",
        VERSION,
        vec![
            FieldDefinition::new("27", "Sequence of Total", "1!n/1!n"),
            FieldDefinition::new("40A", "Form of Documentary Credit", "24x")
                .mandatory()
                .allowed_values(&[
                    "IRREVOCABLE",
                    "IRREVOCABLE TRANSFERABLE",
                    "IRREVOCABLE STANDBY",
                ]),
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("23", "Reference to Pre-Advice", "16x"),
            FieldDefinition::new("31C", "Date of Issue", "6!n"),
            FieldDefinition::new("40E", "Applicable Rules", "30x"),
            FieldDefinition::new("31D", "Date and Place of Expiry", "6!n29x").mandatory(),
            FieldDefinition::new("51A", "Applicant Bank", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("50", "Applicant", "4*35x").mandatory(),
            FieldDefinition::new("59", "Beneficiary", "[/34x]4*35x").mandatory(),
            FieldDefinition::new("32B", "Currency Code, Amount", "3!a15d").mandatory(),
            FieldDefinition::new("39A", "Percentage Credit Amount Tolerance", "2n/2n"),
            FieldDefinition::new("39C", "Additional Amounts Covered", "4*35x"),
            FieldDefinition::new("41A", "Available With ... By ...", "4!a2!a2!c[3!c]")
                .conditional(either_41()),
            FieldDefinition::new("41D", "Available With ... By ...", "4*35x")
                .conditional(either_41()),
            FieldDefinition::new("42C", "Drafts at ...", "3*35x"),
            FieldDefinition::new("42D", "Drawee", "4*35x").conditional(
                Condition::RequiredIfPresent {
                    trigger: "42C".into(),
                },
            ),
            FieldDefinition::new("43P", "Partial Shipments", "35x")
                .allowed_values(&["ALLOWED", "NOT ALLOWED", "CONDITIONAL"]),
            FieldDefinition::new("43T", "Transhipment", "35x")
                .allowed_values(&["ALLOWED", "NOT ALLOWED"]),
            FieldDefinition::new("44A", "Place of Taking in Charge", "65x"),
            FieldDefinition::new("44E", "Port of Loading", "65x"),
            FieldDefinition::new("44F", "Port of Discharge", "65x"),
            FieldDefinition::new("44B", "Place of Final Destination", "65x"),
            FieldDefinition::new("44C", "Latest Date of Shipment", "6!n"),
            FieldDefinition::new("44D", "Shipment Period", "6*65x"),
            FieldDefinition::new("45A", "Description of Goods and/or Services", "100*65x")
                .mandatory(),
            FieldDefinition::new("46A", "Documents Required", "100*65x").mandatory(),
            FieldDefinition::new("47A", "Additional Conditions", "100*65x"),
            FieldDefinition::new("71B", "Charges", "6*35x"),
            FieldDefinition::new("48", "Period for Presentation", "4*35x"),
            FieldDefinition::new("49", "Confirmation Instructions", "7!x").allowed_values(&[
                "CONFIRM",
                "MAY ADD",
                "WITHOUT",
            ]),
            FieldDefinition::new("53A", "Reimbursing Bank", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("78", "Instructions to the Bank", "12*65x"),
            FieldDefinition::new("57A", "Advise Through Bank", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT701 — continuation of the credit text.
fn mt701() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "701",
        VERSION,
        vec![
            FieldDefinition::new("27", "Sequence of Total", "1!n/1!n").mandatory(),
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("45A", "Description of Goods and/or Services", "100*65x"),
            FieldDefinition::new("46A", "Documents Required", "100*65x"),
            FieldDefinition::new("47A", "Additional Conditions", "100*65x"),
        ],
    )
}

/// MT705 — Pre-Advice of a Documentary Credit.
fn mt705() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "705",
        VERSION,
        vec![
            FieldDefinition::new("40A", "Form of Documentary Credit", "24x").mandatory(),
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("31D", "Date and Place of Expiry", "6!n29x"),
            FieldDefinition::new("50", "Applicant", "4*35x").mandatory(),
            FieldDefinition::new("59", "Beneficiary", "[/34x]4*35x").mandatory(),
            FieldDefinition::new("32B", "Currency Code, Amount", "3!a15d").mandatory(),
        ],
    )
}

/// MT707 — Amendment to a Documentary Credit.
fn mt707() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "707",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Receiver's Reference", "16x").mandatory(),
            FieldDefinition::new("23", "Issuing Bank's Reference", "16x"),
            FieldDefinition::new("31C", "Date of Issue", "6!n"),
            FieldDefinition::new("26E", "Number of Amendment", "2n"),
            FieldDefinition::new("30", "Date of Amendment", "6!n"),
            FieldDefinition::new("59", "Beneficiary", "[/34x]4*35x"),
            FieldDefinition::new("31E", "New Date of Expiry", "6!n"),
            FieldDefinition::new("32B", "Increase of Documentary Credit Amount", "3!a15d"),
            FieldDefinition::new("33B", "Decrease of Documentary Credit Amount", "3!a15d"),
            FieldDefinition::new("39A", "Percentage Credit Amount Tolerance", "2n/2n"),
            FieldDefinition::new("44C", "Latest Date of Shipment", "6!n"),
            FieldDefinition::new("79", "Narrative", "35*50x"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT710 — Advice of a Third Bank's Documentary Credit.
fn mt710() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "710",
        VERSION,
        vec![
            FieldDefinition::new("27", "Sequence of Total", "1!n/1!n"),
            FieldDefinition::new("40B", "Form of Documentary Credit", "24x").mandatory(),
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("31C", "Date of Issue", "6!n"),
            FieldDefinition::new("31D", "Date and Place of Expiry", "6!n29x").mandatory(),
            FieldDefinition::new("50", "Applicant", "4*35x").mandatory(),
            FieldDefinition::new("59", "Beneficiary", "[/34x]4*35x").mandatory(),
            FieldDefinition::new("32B", "Currency Code, Amount", "3!a15d").mandatory(),
            FieldDefinition::new("39A", "Percentage Credit Amount Tolerance", "2n/2n"),
            FieldDefinition::new("44C", "Latest Date of Shipment", "6!n"),
            FieldDefinition::new("45A", "Description of Goods and/or Services", "100*65x"),
            FieldDefinition::new("46A", "Documents Required", "100*65x"),
        ],
    )
}

/// MT720 — Transfer of a Documentary Credit.
fn mt720() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "720",
        VERSION,
        vec![
            FieldDefinition::new("27", "Sequence of Total", "1!n/1!n"),
            FieldDefinition::new("40B", "Form of Documentary Credit", "24x").mandatory(),
            FieldDefinition::new("20", "Transferring Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("31D", "Date and Place of Expiry", "6!n29x").mandatory(),
            FieldDefinition::new("50", "First Beneficiary", "4*35x").mandatory(),
            FieldDefinition::new("59", "Second Beneficiary", "[/34x]4*35x").mandatory(),
            FieldDefinition::new("32B", "Currency Code, Amount", "3!a15d").mandatory(),
            FieldDefinition::new("39A", "Percentage Credit Amount Tolerance", "2n/2n"),
            FieldDefinition::new("44C", "Latest Date of Shipment", "6!n"),
        ],
    )
}

/// MT730 — Acknowledgement.
fn mt730() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "730",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Receiver's Reference", "16x").mandatory(),
            FieldDefinition::new("25", "Account Identification", "35x"),
            FieldDefinition::new("30", "Date of Message Being Acknowledged", "6!n").mandatory(),
            FieldDefinition::new("32B", "Amount of Charges", "3!a15d"),
            FieldDefinition::new("71B", "Charges", "6*35x"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT732 — Advice of Discharge.
fn mt732() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "732",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Presenting Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("30", "Date of Advice of Discrepancy", "6!n").mandatory(),
            FieldDefinition::new("32B", "Amount of Utilisation", "3!a15d").mandatory(),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT734 — Advice of Refusal.
fn mt734() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "734",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Presenting Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("32A", "Date and Amount of Utilisation", "6!n3!a15d").mandatory(),
            FieldDefinition::new("73A", "Charges Claimed", "6*35x"),
            FieldDefinition::new("77J", "Discrepancies", "70*50x").mandatory(),
            FieldDefinition::new("77B", "Disposal of Documents", "3*35x"),
        ],
    )
}

/// MT740 — Authorisation to Reimburse.
fn mt740() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "740",
        VERSION,
        vec![
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("25", "Account Identification", "35x"),
            FieldDefinition::new("31D", "Date and Place of Expiry", "6!n29x"),
            FieldDefinition::new("58A", "Negotiating Bank", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("59", "Beneficiary", "[/34x]4*35x"),
            FieldDefinition::new("32B", "Credit Amount", "3!a15d").mandatory(),
            FieldDefinition::new("39A", "Percentage Credit Amount Tolerance", "2n/2n"),
            FieldDefinition::new("71A", "Reimbursing Bank's Charges", "3!a"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT742 — Reimbursement Claim.
fn mt742() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "742",
        VERSION,
        vec![
            FieldDefinition::new("20", "Claiming Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("31C", "Date of Issue", "6!n"),
            FieldDefinition::new("52A", "Issuing Bank", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("32B", "Principal Amount Claimed", "3!a15d").mandatory(),
            FieldDefinition::new("33B", "Additional Amount Claimed", "3!a15d"),
            FieldDefinition::new("34A", "Total Amount Claimed", "6!n3!a15d"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT747 — Amendment to an Authorisation to Reimburse.
fn mt747() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "747",
        VERSION,
        vec![
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("21", "Reimbursing Bank's Reference", "16x"),
            FieldDefinition::new("30", "Date of the Original Authorisation", "6!n").mandatory(),
            FieldDefinition::new("31E", "New Date of Expiry", "6!n"),
            FieldDefinition::new("32B", "Increase of Amount", "3!a15d"),
            FieldDefinition::new("33B", "Decrease of Amount", "3!a15d"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT750 — Advice of Discrepancy.
fn mt750() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "750",
        VERSION,
        vec![
            FieldDefinition::new("20", "Presenting Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("32B", "Principal Amount", "3!a15d").mandatory(),
            FieldDefinition::new("33B", "Additional Amount", "3!a15d"),
            FieldDefinition::new("34B", "Total Amount to be Paid", "3!a15d"),
            FieldDefinition::new("71B", "Charges to be Deducted", "6*35x"),
            FieldDefinition::new("77J", "Discrepancies", "70*50x").mandatory(),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT752 — Authorisation to Pay, Accept or Negotiate.
fn mt752() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "752",
        VERSION,
        vec![
            FieldDefinition::new("20", "Documentary Credit Number", "16x").mandatory(),
            FieldDefinition::new("21", "Presenting Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("23", "Further Identification", "16x").mandatory(),
            FieldDefinition::new("30", "Date of Advice of Discrepancy", "6!n"),
            FieldDefinition::new("32B", "Total Amount Advised", "3!a15d"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT754 — Advice of Payment/Acceptance/Negotiation.
fn mt754() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "754",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Related Reference", "16x").mandatory(),
            FieldDefinition::new("32A", "Principal Amount Paid", "6!n3!a15d").mandatory(),
            FieldDefinition::new("33B", "Additional Amounts", "3!a15d"),
            FieldDefinition::new("53A", "Sender's Correspondent", "4!a2!a2!c[3!c]"),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// MT756 — Advice of Reimbursement or Payment.
fn mt756() -> MessageTypeSchema {
    MessageTypeSchema::new(
        "756",
        VERSION,
        vec![
            FieldDefinition::new("20", "Sender's Reference", "16x").mandatory(),
            FieldDefinition::new("21", "Presenting Bank's Reference", "16x").mandatory(),
            FieldDefinition::new("32B", "Total Amount Claimed", "3!a15d").mandatory(),
            FieldDefinition::new("33A", "Amount Reimbursed or Paid", "6!n3!a15d").mandatory(),
            FieldDefinition::new("72Z", "Sender to Receiver Information", "6*35x"),
        ],
    )
}

/// The legal MT7xx transitions. Continuations carry the credit text across
/// messages; business-flow edges model the wider documentary-credit
/// workflow, including the amendment loop 707 -> 730 -> 707.
pub fn flow_edges() -> Vec<DependencyEdge> {
    vec![
        DependencyEdge::continuation("700", "701", "credit text continuation"),
        DependencyEdge::continuation("710", "711", "advice text continuation"),
        DependencyEdge::continuation("720", "721", "transfer text continuation"),
        DependencyEdge::business("705", "700", "pre-advice followed by issue"),
        DependencyEdge::business("700", "707", "amendment to the credit"),
        DependencyEdge::business("700", "710", "advice through a third bank"),
        DependencyEdge::business("700", "720", "transfer to a second beneficiary"),
        DependencyEdge::business("700", "730", "acknowledgement of the issue"),
        DependencyEdge::business("700", "740", "authorisation to reimburse"),
        DependencyEdge::business("700", "750", "documents presented with discrepancies"),
        DependencyEdge::business("707", "730", "acknowledgement of the amendment"),
        DependencyEdge::business("710", "730", "acknowledgement of the advice"),
        DependencyEdge::business("720", "730", "acknowledgement of the transfer"),
        DependencyEdge::business("730", "707", "further amendment after acknowledgement"),
        DependencyEdge::business("740", "742", "claim under the authorisation"),
        DependencyEdge::business("740", "747", "amendment of the authorisation"),
        DependencyEdge::business("747", "742", "claim under the amended authorisation"),
        DependencyEdge::business("742", "756", "advice of reimbursement"),
        DependencyEdge::business("750", "732", "discrepant documents taken up"),
        DependencyEdge::business("750", "734", "discrepant documents refused"),
        DependencyEdge::business("750", "752", "authorisation to pay despite discrepancies"),
        DependencyEdge::business("750", "754", "payment advised after discrepancy waiver"),
        DependencyEdge::business("734", "732", "discharge after later waiver"),
        DependencyEdge::business("752", "754", "payment advised under authorisation"),
        DependencyEdge::business("754", "756", "reimbursement of the paying bank"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowGraph;
    use crate::schema::SchemaRegistry;

    #[test]
    fn builtin_schemas_load_cleanly() {
        let registry = SchemaRegistry::load(&BuiltinSource).unwrap();
        for code in [
            "700", "701", "705", "707", "710", "720", "730", "732", "734", "740", "742", "747",
            "750", "752", "754", "756",
        ] {
            assert!(registry.contains(code), "missing schema for MT{code}");
        }
    }

    #[test]
    fn builtin_graph_loads_and_gates_refusal() {
        let graph = FlowGraph::load(flow_edges()).unwrap();
        assert_eq!(graph.allowed_predecessors("734"), vec!["750"]);
    }
}
