use crate::core::{
    catalog::{LegacyEntry, PreviousId},
    collect::TranslatableMessage,
};

impl PreviousId {
    /// Previous identity of a message renamed from `candidate`.
    ///
    /// A field that changed records the candidate's value; an unchanged field keeps the
    /// candidate's own previous value, so a chain of renames stays traceable.
    pub fn derive(candidate: &LegacyEntry, message: &TranslatableMessage) -> PreviousId {
        let context = if candidate.context != message.context {
            candidate.context.clone()
        } else {
            candidate.previous.context.clone()
        };
        let singular = if candidate.singular != message.singular {
            Some(candidate.singular.clone())
        } else {
            candidate.previous.singular.clone()
        };
        let plural = if candidate.plural != message.plural {
            candidate.plural.clone()
        } else {
            candidate.previous.plural.clone()
        };

        PreviousId {
            context,
            singular,
            plural,
        }
    }
}
