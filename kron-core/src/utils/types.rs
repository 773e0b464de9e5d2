/// Alias to a scalar floating type.
///
/// NOTE: `f64` everywhere: edge positions can be absolute unix timestamps, and `f32`
/// does not have enough mantissa to keep grain arithmetic exact at that magnitude.
pub type Float = f64;
