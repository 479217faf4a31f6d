//! Runtime type definitions backing the value model.
//!
//! Each series kind owns its buffer type here; `value.rs` ties them together
//! into the `Value` sum. The [`Type`] enum is the dispatch key for
//! type-frames and the spelling `type?` returns.

pub mod binary;
pub mod block;
pub mod function;
pub mod string;

pub(crate) use binary::BinarySeries;
pub(crate) use block::BlockSeries;
pub(crate) use function::{Func, FuncBody, HostFn, NativeFn, RefinementSpec};
pub(crate) use string::StringSeries;

use strum::{Display, EnumString, IntoStaticStr};

/// Value type tags.
///
/// Display forms are the canonical type words (`integer!`, `block!`, ...),
/// used by `type?`, action dispatch errors, and type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Type {
    #[strum(serialize = "integer!")]
    Integer,
    #[strum(serialize = "decimal!")]
    Decimal,
    #[strum(serialize = "logic!")]
    Logic,
    #[strum(serialize = "none!")]
    None,
    #[strum(serialize = "string!")]
    String,
    #[strum(serialize = "binary!")]
    Binary,
    #[strum(serialize = "block!")]
    Block,
    #[strum(serialize = "paren!")]
    Paren,
    #[strum(serialize = "word!")]
    Word,
    #[strum(serialize = "set-word!")]
    SetWord,
    #[strum(serialize = "get-word!")]
    GetWord,
    #[strum(serialize = "lit-word!")]
    LitWord,
    #[strum(serialize = "path!")]
    Path,
    #[strum(serialize = "set-path!")]
    SetPath,
    #[strum(serialize = "get-path!")]
    GetPath,
    #[strum(serialize = "refinement!")]
    Refinement,
    #[strum(serialize = "function!")]
    Function,
    #[strum(serialize = "object!")]
    Object,
    #[strum(serialize = "error!")]
    Error,
}
