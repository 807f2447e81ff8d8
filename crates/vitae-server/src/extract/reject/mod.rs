//! Request body extractors with client-friendly rejections.

mod lenient_json;

pub use self::lenient_json::LenientJson;
