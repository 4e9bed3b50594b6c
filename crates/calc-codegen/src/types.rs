//! calc type to C type mapping.

use calc_ir::Type;

/// The C spelling of a calc type.
///
/// | Type    | C         |
/// |---------|-----------|
/// | Int     | `int32_t` |
/// | Bool    | `bool`    |
/// | Invalid | `int`     |
pub fn c_type(ty: Type) -> &'static str {
    match ty {
        Type::Int => "int32_t",
        Type::Bool => "bool",
        Type::Invalid => "int",
    }
}

/// Initial value of a temporary before any branch assigns it.
pub fn zero_value(ty: Type) -> &'static str {
    match ty {
        Type::Bool => "false",
        Type::Int | Type::Invalid => "0",
    }
}
