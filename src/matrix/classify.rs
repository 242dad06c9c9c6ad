//! Cell classification from endpoint addressing flags.

use serde::Serialize;

use crate::catalog::store::EndpointRow;

/// IPv6-support class of one matrix cell.
///
/// Derived from the four addressing flags, never stored. A missing endpoint
/// row counts as all flags false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellClass {
    /// The default endpoint answers over IPv6.
    Ipv6,
    /// Only the dualstack (opt-in) endpoint answers over IPv6.
    Ipv6DualstackOptin,
    /// IPv4 only, on either endpoint.
    Ipv4,
    /// No usable endpoint for this service/region pair.
    Unavailable,
}

impl CellClass {
    /// Short cell text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ipv6 => "IPv6",
            Self::Ipv6DualstackOptin => "opt-in",
            Self::Ipv4 => "IPv4",
            Self::Unavailable => "-",
        }
    }
}

/// Classify one cell. Precedence is strict, first match wins:
/// default-IPv6, then dualstack-IPv6, then any-IPv4, then unavailable.
#[must_use]
pub fn classify_cell(endpoint: Option<&EndpointRow>) -> CellClass {
    let Some(ep) = endpoint else {
        return CellClass::Unavailable;
    };

    if ep.default_has_ipv6 {
        CellClass::Ipv6
    } else if ep.dualstack_has_ipv6 {
        CellClass::Ipv6DualstackOptin
    } else if ep.default_has_ipv4 || ep.dualstack_has_ipv4 {
        CellClass::Ipv4
    } else {
        CellClass::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        default_has_ipv4: bool,
        default_has_ipv6: bool,
        dualstack_has_ipv4: bool,
        dualstack_has_ipv6: bool,
    ) -> EndpointRow {
        EndpointRow {
            service_name: "svc".to_string(),
            region_name: "rgn".to_string(),
            default_has_ipv4,
            default_has_ipv6,
            dualstack_has_ipv4,
            dualstack_has_ipv6,
            ..EndpointRow::default()
        }
    }

    #[test]
    fn missing_row_is_unavailable() {
        assert_eq!(classify_cell(None), CellClass::Unavailable);
    }

    #[test]
    fn all_sixteen_flag_combinations() {
        use CellClass::{Ipv4, Ipv6, Ipv6DualstackOptin, Unavailable};

        // (default_v4, default_v6, dualstack_v4, dualstack_v6) → class
        let table = [
            ((false, false, false, false), Unavailable),
            ((false, false, false, true), Ipv6DualstackOptin),
            ((false, false, true, false), Ipv4),
            ((false, false, true, true), Ipv6DualstackOptin),
            ((false, true, false, false), Ipv6),
            ((false, true, false, true), Ipv6),
            ((false, true, true, false), Ipv6),
            ((false, true, true, true), Ipv6),
            ((true, false, false, false), Ipv4),
            ((true, false, false, true), Ipv6DualstackOptin),
            ((true, false, true, false), Ipv4),
            ((true, false, true, true), Ipv6DualstackOptin),
            ((true, true, false, false), Ipv6),
            ((true, true, false, true), Ipv6),
            ((true, true, true, false), Ipv6),
            ((true, true, true, true), Ipv6),
        ];

        for ((dv4, dv6, sv4, sv6), expected) in table {
            let got = classify_cell(Some(&row(dv4, dv6, sv4, sv6)));
            assert_eq!(
                got, expected,
                "flags default_v4={dv4} default_v6={dv6} dualstack_v4={sv4} dualstack_v6={sv6}"
            );
        }
    }

    #[test]
    fn default_ipv6_beats_everything() {
        // Even a fully IPv4-capable pair classifies as IPv6 when the default
        // endpoint has it.
        assert_eq!(
            classify_cell(Some(&row(true, true, true, false))),
            CellClass::Ipv6
        );
    }

    #[test]
    fn labels() {
        assert_eq!(CellClass::Ipv6.label(), "IPv6");
        assert_eq!(CellClass::Ipv6DualstackOptin.label(), "opt-in");
        assert_eq!(CellClass::Ipv4.label(), "IPv4");
        assert_eq!(CellClass::Unavailable.label(), "-");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn classification_is_total_and_consistent(
                dv4: bool, dv6: bool, sv4: bool, sv6: bool
            ) {
                let class = classify_cell(Some(&row(dv4, dv6, sv4, sv6)));
                if dv6 {
                    prop_assert_eq!(class, CellClass::Ipv6);
                } else if sv6 {
                    prop_assert_eq!(class, CellClass::Ipv6DualstackOptin);
                } else if dv4 || sv4 {
                    prop_assert_eq!(class, CellClass::Ipv4);
                } else {
                    prop_assert_eq!(class, CellClass::Unavailable);
                }
            }
        }
    }
}
