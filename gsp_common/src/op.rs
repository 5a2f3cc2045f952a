/// Implements the arithmetic operator traits for single-field newtypes. Each operator delegates to the named
/// saturating method of the inner integer, so totals clamp at the numeric bounds instead of wrapping or panicking.
///
/// ```ignore
/// op!(binary Money, Add, add, saturating_add);
/// op!(inplace Money, AddAssign, add_assign, saturating_add);
/// op!(unary Money, Neg, neg, saturating_neg);
/// ```
#[macro_export]
macro_rules! op {
    (binary $for_struct:ident, $impl_trait:ident, $impl_fn:ident, $inner_fn:ident) => {
        impl $impl_trait for $for_struct {
            type Output = Self;

            fn $impl_fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$inner_fn(rhs.0))
            }
        }
    };

    (inplace $for_struct:ident, $impl_trait:ident, $impl_fn:ident, $inner_fn:ident) => {
        impl $impl_trait for $for_struct {
            fn $impl_fn(&mut self, rhs: Self) {
                self.0 = self.0.$inner_fn(rhs.0)
            }
        }
    };

    (unary $for_struct:ident, $impl_trait:ident, $impl_fn:ident, $inner_fn:ident) => {
        impl $impl_trait for $for_struct {
            type Output = Self;

            fn $impl_fn(self) -> Self::Output {
                Self(self.0.$inner_fn())
            }
        }
    };
}
