//! Primitive wire codecs.
//!
//! Every decoder takes `(buffer, offset)` and returns `(value, new_offset)`;
//! every encoder takes `(buffer, offset, value)` and returns `new_offset`.
//! Encoders check capacity before touching the buffer, so a failed encode
//! leaves it unchanged.
//!
//! Two length conventions live side by side and are deliberately kept apart:
//!
//! | Family   | Prefix            | Null | Empty |
//! |----------|-------------------|------|-------|
//! | legacy   | `int16` length    | `-1` | `0`   |
//! | compact  | varint `len + 1`  | `0`  | `1`   |

mod decode;
mod encode;
mod tagged_fields;

use std::collections::BTreeMap;

pub use decode::{
    decode_bool, decode_compact_nullable_string, decode_compact_string, decode_int16,
    decode_int32, decode_int8, decode_nullable_string, decode_unsigned_varint, decode_uuid,
};
pub use encode::{
    compact_nullable_string_len, compact_string_len, encode_bool, encode_compact_nullable_string,
    encode_compact_string, encode_int16, encode_int32, encode_int8, encode_nullable_string,
    encode_unsigned_varint, encode_uuid, nullable_string_len, unsigned_varint_len,
};
pub use tagged_fields::{decode_tagged_fields, encode_tagged_fields, tagged_fields_len};

pub type TagId = u64;

/// The extensible tail block of flexible messages. Ordered by tag id so that
/// encoding is deterministic.
pub type TaggedFields = BTreeMap<TagId, String>;
