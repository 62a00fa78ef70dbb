// rust/dataset-core/src/dataset/compare.rs

//! Element-wise comparison of a golden buffer against a result buffer.
//!
//! Buffers hold raw native-endian elements, exactly as they sit in batch
//! files. Floating-point elements match when
//! `|golden - result| <= atol + rtol * |golden|`; integer elements must be
//! equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Element type used to interpret raw batch bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    #[default]
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 | Self::I64 | Self::U64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }

    /// Decodes the element starting at `bytes[0]` as `f64`.
    ///
    /// `bytes` must hold at least `self.size()` bytes. 64-bit integers
    /// beyond 2^53 lose precision, which only matters for the reported
    /// difference; equality of integers is checked on raw bytes.
    fn decode(self, bytes: &[u8]) -> f64 {
        macro_rules! ne {
            ($t:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                <$t>::from_ne_bytes(raw) as f64
            }};
        }
        match self {
            Self::F32 => ne!(f32, 4),
            Self::F64 => ne!(f64, 8),
            Self::I8 => ne!(i8, 1),
            Self::I16 => ne!(i16, 2),
            Self::I32 => ne!(i32, 4),
            Self::I64 => ne!(i64, 8),
            Self::U8 => ne!(u8, 1),
            Self::U16 => ne!(u16, 2),
            Self::U32 => ne!(u32, 4),
            Self::U64 => ne!(u64, 8),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "f32" | "float32" => Ok(Self::F32),
            "f64" | "float64" => Ok(Self::F64),
            "i8" | "int8" => Ok(Self::I8),
            "i16" | "int16" => Ok(Self::I16),
            "i32" | "int32" => Ok(Self::I32),
            "i64" | "int64" => Ok(Self::I64),
            "u8" | "uint8" => Ok(Self::U8),
            "u16" | "uint16" => Ok(Self::U16),
            "u32" | "uint32" => Ok(Self::U32),
            "u64" | "uint64" => Ok(Self::U64),
            _ => Err(DatasetError::config(format!("unknown element type '{s}'"))),
        }
    }
}

/// Absolute and relative tolerance for floating-point comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Tolerance {
    pub const EXACT: Self = Self { atol: 0.0, rtol: 0.0 };

    pub fn new(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol }
    }

    fn accepts(&self, golden: f64, result: f64) -> bool {
        if golden.is_nan() || result.is_nan() {
            return golden.is_nan() && result.is_nan();
        }
        if golden == result {
            // Covers matching infinities
            return true;
        }
        if golden.is_infinite() || result.is_infinite() {
            return false;
        }
        (golden - result).abs() <= self.atol + self.rtol * golden.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { atol: 1e-5, rtol: 1e-5 }
    }
}

/// A single mismatching element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub golden: f64,
    pub result: f64,
}

/// Outcome of comparing two buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareReport {
    pub dtype: ElementType,
    pub elements: usize,
    pub mismatched: usize,
    /// Largest `|golden - result|` over all non-NaN element pairs.
    pub max_abs_diff: f64,
    /// First mismatches in index order, at most `max_report` of them.
    pub first_mismatches: Vec<Mismatch>,
}

impl CompareReport {
    pub fn passed(&self) -> bool {
        self.mismatched == 0
    }
}

impl fmt::Display for CompareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} elements mismatched, max abs diff {:e}",
            self.mismatched, self.elements, self.dtype, self.max_abs_diff
        )
    }
}

/// Default number of mismatches kept in a report.
pub const DEFAULT_MAX_REPORT: usize = 10;

/// Compares `result` against `golden`, both interpreted as `dtype`.
///
/// # Errors
///
/// Returns `DatasetError::Comparison` if the buffers differ in length or
/// the length is not a whole number of elements.
pub fn compare_buffers(
    golden: &[u8],
    result: &[u8],
    dtype: ElementType,
    tolerance: Tolerance,
) -> Result<CompareReport> {
    compare_buffers_with_limit(golden, result, dtype, tolerance, DEFAULT_MAX_REPORT)
}

/// [`compare_buffers`] keeping up to `max_report` mismatches in the report.
///
/// # Errors
///
/// Same as [`compare_buffers`].
pub fn compare_buffers_with_limit(
    golden: &[u8],
    result: &[u8],
    dtype: ElementType,
    tolerance: Tolerance,
    max_report: usize,
) -> Result<CompareReport> {
    if golden.len() != result.len() {
        return Err(DatasetError::comparison(format!(
            "length mismatch: golden has {} bytes, result has {}",
            golden.len(),
            result.len()
        )));
    }
    let size = dtype.size();
    if golden.len() % size != 0 {
        return Err(DatasetError::comparison(format!(
            "{} bytes is not a whole number of {dtype} elements",
            golden.len()
        )));
    }

    let mut report = CompareReport {
        dtype,
        elements: golden.len() / size,
        mismatched: 0,
        max_abs_diff: 0.0,
        first_mismatches: Vec::new(),
    };

    for (index, (g_raw, r_raw)) in golden
        .chunks_exact(size)
        .zip(result.chunks_exact(size))
        .enumerate()
    {
        let g = dtype.decode(g_raw);
        let r = dtype.decode(r_raw);

        let diff = (g - r).abs();
        if !diff.is_nan() && diff > report.max_abs_diff {
            report.max_abs_diff = diff;
        }

        let matched = if dtype.is_float() {
            tolerance.accepts(g, r)
        } else {
            g_raw == r_raw
        };
        if !matched {
            report.mismatched += 1;
            if report.first_mismatches.len() < max_report {
                report.first_mismatches.push(Mismatch {
                    index,
                    golden: g,
                    result: r,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn test_identical_f32_passes() {
        let data = f32_bytes(&[1.0, -2.5, 3.25]);
        let report = compare_buffers(&data, &data, ElementType::F32, Tolerance::EXACT).unwrap();

        assert!(report.passed());
        assert_eq!(report.elements, 3);
        assert_eq!(report.max_abs_diff, 0.0);
    }

    #[test]
    fn test_f32_within_tolerance() {
        let golden = f32_bytes(&[1.0, 100.0]);
        let result = f32_bytes(&[1.0005, 100.05]);

        let loose = Tolerance::new(1e-3, 1e-3);
        assert!(compare_buffers(&golden, &result, ElementType::F32, loose)
            .unwrap()
            .passed());

        let strict = Tolerance::new(1e-6, 0.0);
        let report = compare_buffers(&golden, &result, ElementType::F32, strict).unwrap();
        assert_eq!(report.mismatched, 2);
        assert_eq!(report.first_mismatches[0].index, 0);
        assert!((report.max_abs_diff - 0.05).abs() < 1e-3);
    }

    #[test]
    fn test_nan_handling() {
        let golden = f32_bytes(&[f32::NAN, 1.0]);
        let same = f32_bytes(&[f32::NAN, 1.0]);
        let differs = f32_bytes(&[0.0, f32::NAN]);

        let tol = Tolerance::default();
        assert!(compare_buffers(&golden, &same, ElementType::F32, tol).unwrap().passed());
        assert_eq!(
            compare_buffers(&golden, &differs, ElementType::F32, tol)
                .unwrap()
                .mismatched,
            2
        );
    }

    #[test]
    fn test_infinities() {
        let golden = f32_bytes(&[f32::INFINITY, f32::NEG_INFINITY]);
        let tol = Tolerance::default();
        assert!(compare_buffers(&golden, &golden, ElementType::F32, tol).unwrap().passed());

        let flipped = f32_bytes(&[f32::NEG_INFINITY, f32::INFINITY]);
        assert_eq!(
            compare_buffers(&golden, &flipped, ElementType::F32, tol)
                .unwrap()
                .mismatched,
            2
        );
    }

    #[test]
    fn test_integers_compare_exactly() {
        let golden: Vec<u8> = [7i32, -3].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let result: Vec<u8> = [7i32, -2].iter().flat_map(|v| v.to_ne_bytes()).collect();

        let huge = Tolerance::new(10.0, 10.0);
        let report = compare_buffers(&golden, &result, ElementType::I32, huge).unwrap();
        assert_eq!(report.mismatched, 1);
        assert_eq!(
            report.first_mismatches,
            vec![Mismatch { index: 1, golden: -3.0, result: -2.0 }]
        );
    }

    #[test]
    fn test_report_limit() {
        let golden = vec![0u8; 32];
        let result = vec![1u8; 32];
        let report =
            compare_buffers_with_limit(&golden, &result, ElementType::U8, Tolerance::EXACT, 4)
                .unwrap();

        assert_eq!(report.mismatched, 32);
        assert_eq!(report.first_mismatches.len(), 4);
        assert_eq!(report.first_mismatches[3].index, 3);
    }

    #[test]
    fn test_length_errors() {
        let tol = Tolerance::default();
        assert!(compare_buffers(&[0u8; 8], &[0u8; 4], ElementType::F32, tol).is_err());
        assert!(compare_buffers(&[0u8; 6], &[0u8; 6], ElementType::F32, tol).is_err());
        assert!(compare_buffers(&[], &[], ElementType::F64, tol).unwrap().passed());
    }

    #[test]
    fn test_element_type_parse() {
        assert_eq!("f32".parse::<ElementType>().unwrap(), ElementType::F32);
        assert_eq!("Float64".parse::<ElementType>().unwrap(), ElementType::F64);
        assert_eq!("uint16".parse::<ElementType>().unwrap(), ElementType::U16);
        assert!("bf16".parse::<ElementType>().is_err());
        assert_eq!(ElementType::I64.size(), 8);
        assert_eq!(ElementType::U8.to_string(), "u8");
    }
}
