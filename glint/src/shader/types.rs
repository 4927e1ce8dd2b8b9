//! Shader type wrappers.
//!
//! These types are used, mostly, to be passed to shaders as uniform values through
//! [`ProgramInterface::set`].
//!
//! Matrices are stored **row-major**: `Mat44([row0, row1, row2, row3])`. GLSL reads matrices
//! column-major, so backends upload them with their transpose flag set and the shader sees the
//! matrix you wrote, not its transpose.
//!
//! [`ProgramInterface::set`]: crate::shader::ProgramInterface::set

use std::ops::{Deref, DerefMut};

macro_rules! vector {
  ($t:ident, $n:literal, $doc:literal, $($c:ident),+) => {
    #[doc = $doc]
    ///
    #[doc = concat!("This is akin to a `[T; ", stringify!($n), "]`.")]
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct $t<T>(pub [T; $n]);

    impl<T> From<[T; $n]> for $t<T> {
      fn from(a: [T; $n]) -> Self {
        $t(a)
      }
    }

    impl<T> From<$t<T>> for [T; $n] {
      fn from($t(a): $t<T>) -> Self {
        a
      }
    }

    impl<T> AsRef<[T; $n]> for $t<T> {
      fn as_ref(&self) -> &[T; $n] {
        &self.0
      }
    }

    impl<T> Deref for $t<T> {
      type Target = [T; $n];

      fn deref(&self) -> &Self::Target {
        &self.0
      }
    }

    impl<T> DerefMut for $t<T> {
      fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
      }
    }

    impl<T> $t<T> {
      /// Create a new vector.
      pub const fn new($($c: T),+) -> Self {
        Self([$($c),+])
      }
    }
  };
}

vector!(Vec2, 2, "A 2 dimensional vector.", x, y);
vector!(Vec3, 3, "A 3 dimensional vector.", x, y, z);
vector!(Vec4, 4, "A 4 dimensional vector.", x, y, z, w);

macro_rules! matrix {
  ($t:ident, $n:literal) => {
    /// Square matrix, stored as an array of rows.
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct $t<T>(pub [[T; $n]; $n]);

    impl<T> From<[[T; $n]; $n]> for $t<T> {
      fn from(rows: [[T; $n]; $n]) -> Self {
        $t(rows)
      }
    }

    impl<T> From<$t<T>> for [[T; $n]; $n] {
      fn from($t(rows): $t<T>) -> Self {
        rows
      }
    }

    impl<T> AsRef<[[T; $n]; $n]> for $t<T> {
      fn as_ref(&self) -> &[[T; $n]; $n] {
        &self.0
      }
    }

    impl<T> Deref for $t<T> {
      type Target = [[T; $n]; $n];

      fn deref(&self) -> &Self::Target {
        &self.0
      }
    }

    impl<T> DerefMut for $t<T> {
      fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
      }
    }

    impl<T> $t<T>
    where
      T: Copy,
    {
      /// Create a matrix from its rows.
      pub fn from_rows(rows: impl Into<[[T; $n]; $n]>) -> Self {
        $t(rows.into())
      }

      /// Create a matrix from its columns, as handed out by column-major math libraries.
      pub fn from_cols(cols: impl Into<[[T; $n]; $n]>) -> Self {
        $t(cols.into()).transpose()
      }

      /// Swap rows and columns.
      pub fn transpose(&self) -> Self {
        let mut out = self.0;

        for (r, row) in self.0.iter().enumerate() {
          for (c, x) in row.iter().enumerate() {
            out[c][r] = *x;
          }
        }

        $t(out)
      }

      /// Flatten the matrix, row after row.
      pub fn to_row_major(&self) -> [T; $n * $n] {
        let mut out = [self.0[0][0]; $n * $n];

        for (r, row) in self.0.iter().enumerate() {
          out[r * $n..(r + 1) * $n].copy_from_slice(row);
        }

        out
      }
    }
  };
}

matrix!(Mat22, 2);
matrix!(Mat33, 3);
matrix!(Mat44, 4);
