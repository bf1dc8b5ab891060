use crate::catalog::EffectKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("{0}")]
    UnknownEffect(String),
    #[error("{effect} has no control named '{id}'")]
    UnknownControl { effect: EffectKind, id: String },
    #[error("invalid value for {effect}.{id}: {reason}")]
    InvalidValue {
        effect: EffectKind,
        id: String,
        reason: String,
    },
}
