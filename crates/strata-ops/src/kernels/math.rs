//! Scalar math shared by the elementwise kernels.

use num_complex::Complex;
use strata_core::Element;

/// Element math used by the kernels, uniform over real and complex types.
///
/// Real types follow the usual IEEE functions; complex types use the
/// principal branch.
pub(crate) trait Numeric: Element {
    fn pow(self, exponent: Self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn sinc(self) -> Self;
    fn ln(self) -> Self;
    fn log2(self) -> Self;
    fn log10(self) -> Self;
    fn exp(self) -> Self;
    fn sqrt(self) -> Self;
    fn conj(self) -> Self;
    fn magnitude(self) -> Self::Real;
    fn angle(self) -> Self::Real;
    fn real_part(self) -> Self::Real;
    fn imag_part(self) -> Self::Real;
}

macro_rules! impl_real_numeric {
    ($t:ident) => {
        impl Numeric for $t {
            fn pow(self, exponent: Self) -> Self {
                self.powf(exponent)
            }
            fn sin(self) -> Self {
                $t::sin(self)
            }
            fn cos(self) -> Self {
                $t::cos(self)
            }
            fn tan(self) -> Self {
                $t::tan(self)
            }
            fn sinc(self) -> Self {
                if self == 0.0 {
                    return 1.0;
                }
                let x = self * std::$t::consts::PI;
                $t::sin(x) / x
            }
            fn ln(self) -> Self {
                $t::ln(self)
            }
            fn log2(self) -> Self {
                $t::log2(self)
            }
            fn log10(self) -> Self {
                $t::log10(self)
            }
            fn exp(self) -> Self {
                $t::exp(self)
            }
            fn sqrt(self) -> Self {
                $t::sqrt(self)
            }
            fn conj(self) -> Self {
                self
            }
            fn magnitude(self) -> Self {
                self.abs()
            }
            fn angle(self) -> Self {
                if self.is_sign_negative() {
                    std::$t::consts::PI
                } else {
                    0.0
                }
            }
            fn real_part(self) -> Self {
                self
            }
            fn imag_part(self) -> Self {
                0.0
            }
        }
    };
}

macro_rules! impl_complex_numeric {
    ($t:ident) => {
        impl Numeric for Complex<$t> {
            fn pow(self, exponent: Self) -> Self {
                self.powc(exponent)
            }
            fn sin(self) -> Self {
                Complex::sin(self)
            }
            fn cos(self) -> Self {
                Complex::cos(self)
            }
            fn tan(self) -> Self {
                Complex::tan(self)
            }
            fn sinc(self) -> Self {
                if self.re == 0.0 && self.im == 0.0 {
                    return Complex::new(1.0, 0.0);
                }
                let z = self * std::$t::consts::PI;
                Complex::sin(z) / z
            }
            fn ln(self) -> Self {
                Complex::ln(self)
            }
            fn log2(self) -> Self {
                Complex::ln(self) / std::$t::consts::LN_2
            }
            fn log10(self) -> Self {
                Complex::ln(self) / std::$t::consts::LN_10
            }
            fn exp(self) -> Self {
                Complex::exp(self)
            }
            fn sqrt(self) -> Self {
                Complex::sqrt(self)
            }
            fn conj(self) -> Self {
                Complex::conj(&self)
            }
            fn magnitude(self) -> $t {
                self.norm()
            }
            fn angle(self) -> $t {
                self.arg()
            }
            fn real_part(self) -> $t {
                self.re
            }
            fn imag_part(self) -> $t {
                self.im
            }
        }
    };
}

impl_real_numeric!(f32);
impl_real_numeric!(f64);
impl_complex_numeric!(f32);
impl_complex_numeric!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_angle_is_zero_or_pi() {
        assert_eq!(Numeric::angle(2.0f64), 0.0);
        assert_eq!(Numeric::angle(-2.0f64), std::f64::consts::PI);
    }

    #[test]
    fn sinc_is_one_at_origin_and_zero_at_integers() {
        assert_eq!(Numeric::sinc(0.0f64), 1.0);
        assert!(Numeric::sinc(2.0f64).abs() < 1e-15);
        assert_eq!(Numeric::sinc(Complex::new(0.0f32, 0.0)), Complex::new(1.0, 0.0));
    }

    #[test]
    fn complex_magnitude_and_parts() {
        let z = Complex::new(3.0f64, -4.0);
        assert_eq!(z.magnitude(), 5.0);
        assert_eq!(z.real_part(), 3.0);
        assert_eq!(z.imag_part(), -4.0);
        assert_eq!(Numeric::conj(z), Complex::new(3.0, 4.0));
    }

    #[test]
    fn complex_log2_of_eight() {
        let z = Numeric::log2(Complex::new(8.0f64, 0.0));
        assert!((z.re - 3.0).abs() < 1e-12);
        assert!(z.im.abs() < 1e-12);
    }
}
