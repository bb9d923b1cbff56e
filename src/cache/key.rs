//! Hierarchical storage keys for Gram matrix triangles
//!
//! A key has the form `/<fingerprint>/<kernel tag>_<p1>_<p2>_<p3>`. The three
//! parameter slots are fixed: the linear kernel has none (`_0_0_0`), the RBF
//! kernel fills the first with gamma (`_<gamma>_0_0`). Unused slots are always
//! zero and are kept so existing stores stay addressable.

use crate::cache::DataFingerprint;
use crate::core::{GramError, KernelSpec, Result};
use std::fmt;

/// Significant digits used when rendering gamma
pub const GAMMA_SIGNIFICANT_DIGITS: usize = 16;

/// Path of one stored triangle: `/<namespace>/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    path: String,
    // Byte offset of the '/' between namespace and name
    split: usize,
}

impl StorageKey {
    /// Derive the key of `spec` within the namespace of `fingerprint`
    pub fn build(fingerprint: &DataFingerprint, spec: &KernelSpec) -> Self {
        let namespace = fingerprint.to_hex();
        let name = match spec {
            KernelSpec::Linear => format!("{}_0_0_0", spec.tag()),
            KernelSpec::Rbf { gamma } => format!("{}_{}_0_0", spec.tag(), format_gamma(*gamma)),
        };
        Self {
            split: namespace.len() + 1,
            path: format!("/{namespace}/{name}"),
        }
    }

    /// Parse a `/<namespace>/<name>` path
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = || GramError::InvalidParameter(format!("Invalid storage key: {path:?}"));

        let rest = path.strip_prefix('/').ok_or_else(invalid)?;
        let (namespace, name) = rest.split_once('/').ok_or_else(invalid)?;
        if namespace.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            path: path.to_string(),
            split: namespace.len() + 1,
        })
    }

    /// Leading path segment, the data fingerprint
    pub fn namespace(&self) -> &str {
        &self.path[1..self.split]
    }

    /// Last path segment, the kernel tag and parameters
    pub fn name(&self) -> &str {
        &self.path[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Render gamma like C's `%.16g`
pub fn format_gamma(gamma: f64) -> String {
    format_general(gamma, GAMMA_SIGNIFICANT_DIGITS)
}

/// `%g`-style formatting with `precision` significant digits
///
/// Uses fixed notation when the decimal exponent lies in
/// `-4..precision`, scientific notation with a signed two-digit exponent
/// otherwise; trailing zeros are removed in both cases.
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    // The exponent after rounding to `precision` digits picks the notation
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_trailing_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fingerprint() -> DataFingerprint {
        DataFingerprint::of_bytes(b"gram")
    }

    #[test]
    fn test_linear_key() {
        let fp = fingerprint();
        let key = StorageKey::build(&fp, &KernelSpec::Linear);

        assert_eq!(key.as_str(), format!("/{fp}/KernelType.LINEAR_0_0_0"));
        assert_eq!(key.namespace(), fp.to_hex());
        assert_eq!(key.name(), "KernelType.LINEAR_0_0_0");
    }

    #[test]
    fn test_rbf_key() {
        let fp = fingerprint();

        let key = StorageKey::build(&fp, &KernelSpec::Rbf { gamma: 32.0 });
        assert_eq!(key.name(), "KernelType.RBF_32_0_0");

        let key = StorageKey::build(&fp, &KernelSpec::Rbf { gamma: 2f64.powi(-25) });
        assert_eq!(key.name(), "KernelType.RBF_2.980232238769531e-08_0_0");
        assert_eq!(key.to_string(), format!("/{fp}/{}", key.name()));
    }

    #[test]
    fn test_format_gamma_matches_printf() {
        let cases = [
            (32.0, "32"),
            (1.0, "1"),
            (0.5, "0.5"),
            (0.0625, "0.0625"),
            (0.1, "0.1"),
            (1.0 / 3.0, "0.3333333333333333"),
            (2f64.powi(-25), "2.980232238769531e-08"),
            (1e-5, "1e-05"),
            (0.0001, "0.0001"),
            (1048576.0, "1048576"),
            (1e16, "1e+16"),
            (1234567890123456.0, "1234567890123456"),
            (std::f64::consts::FRAC_1_SQRT_2, "0.7071067811865476"),
            (-2.5, "-2.5"),
            (0.0, "0"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_gamma(value), expected, "value {value:e}");
        }
    }

    #[test]
    fn test_format_general_special_values() {
        assert_eq!(format_general(f64::NAN, 16), "nan");
        assert_eq!(format_general(f64::INFINITY, 16), "inf");
        assert_eq!(format_general(f64::NEG_INFINITY, 16), "-inf");
        assert_eq!(format_general(123.456, 3), "123");
        assert_eq!(format_general(1234.5, 3), "1.23e+03");
    }

    #[test]
    fn test_keys_unique_across_sweep() {
        let fp = fingerprint();
        let gammas = crate::sweep::logrange(-25.0, 5.0, 0.5, 2.0).unwrap();

        let mut keys: HashSet<StorageKey> = gammas
            .iter()
            .map(|&gamma| StorageKey::build(&fp, &KernelSpec::Rbf { gamma }))
            .collect();
        keys.insert(StorageKey::build(&fp, &KernelSpec::Linear));

        assert_eq!(keys.len(), gammas.len() + 1);
        assert!(keys.iter().all(|k| k.namespace() == fp.to_hex()));
    }

    #[test]
    fn test_parse_round_trip() {
        let key = StorageKey::build(&fingerprint(), &KernelSpec::Rbf { gamma: 0.5 });
        let parsed = StorageKey::parse(key.as_str()).unwrap();

        assert_eq!(parsed, key);
        assert_eq!(parsed.name(), "KernelType.RBF_0.5_0_0");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for path in ["", "/", "abc/def", "/abc", "/abc/", "//def", "/a/b/c"] {
            assert!(StorageKey::parse(path).is_err(), "{path:?}");
        }
    }
}
