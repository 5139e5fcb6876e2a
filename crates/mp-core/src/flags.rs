//! Bit-set newtypes for platform flag words.

macro_rules! impl_flags {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub const fn empty() -> Self {
                    Self(0)
                }

                pub const fn from_bits(bits: u32) -> Self {
                    Self(bits)
                }

                pub const fn bits(self) -> u32 {
                    self.0
                }

                /// All bits of `other` are set.
                pub const fn contains(self, other: Self) -> bool {
                    self.0 & other.0 == other.0
                }

                /// At least one bit of `other` is set.
                pub const fn intersects(self, other: Self) -> bool {
                    self.0 & other.0 != 0
                }
            }

            impl std::ops::BitOr for $name {
                type Output = Self;

                fn bitor(self, rhs: Self) -> Self {
                    Self(self.0 | rhs.0)
                }
            }

            impl std::ops::BitOrAssign for $name {
                fn bitor_assign(&mut self, rhs: Self) {
                    self.0 |= rhs.0;
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{:#x}", self.0)
                }
            }
        )*
    };
}

pub(crate) use impl_flags;
