//! The [`Sample`] trait: fixed-width numeric element types.

/// A fixed-width numeric value storable in a growable store.
///
/// Implemented for the primitive integer and float types a host array
/// library can view directly. `WIDTH` is the element stride in bytes
/// reported by buffer views.
pub trait Sample: Copy + PartialEq + Default + Send + Sync + 'static {
    /// Size of one sample in bytes.
    const WIDTH: usize = std::mem::size_of::<Self>();

    /// Short type code (`"f64"`, `"i32"`, ...) for diagnostics.
    const TYPE_NAME: &'static str;
}

macro_rules! impl_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                const TYPE_NAME: &'static str = stringify!($t);
            }
        )*
    };
}

impl_sample!(f32, f64, i32, i64, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_matches_size_of() {
        assert_eq!(<f64 as Sample>::WIDTH, 8);
        assert_eq!(<f32 as Sample>::WIDTH, 4);
        assert_eq!(<i32 as Sample>::WIDTH, 4);
        assert_eq!(<u64 as Sample>::WIDTH, 8);
    }

    #[test]
    fn type_names() {
        assert_eq!(<f64 as Sample>::TYPE_NAME, "f64");
        assert_eq!(<i64 as Sample>::TYPE_NAME, "i64");
    }
}
