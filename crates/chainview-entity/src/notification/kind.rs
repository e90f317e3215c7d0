//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// What happened, from the recipient's point of view.
///
/// The set is closed; values the client does not know decode to
/// [`NotificationKind::Unknown`] so a newer backend cannot break decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A purchase order was confirmed by the counterparty.
    OrderConfirmed,
    /// A purchase order was shipped.
    OrderShipped,
    /// A supplier uploaded a document.
    DocumentUploaded,
    /// A submitted document was approved.
    DocumentApproved,
    /// A submitted document was rejected.
    DocumentRejected,
    /// A product's transparency record changed.
    TransparencyUpdated,
    /// A certification is about to expire.
    CertificationExpiring,
    /// A supplier was invited to the network.
    SupplierInvited,
    /// Platform-level alert.
    SystemAlert,
    /// A kind this client version does not know.
    #[serde(other)]
    Unknown,
}

impl NotificationKind {
    /// Every kind this client knows, in display order.
    pub const ALL: [Self; 9] = [
        Self::OrderConfirmed,
        Self::OrderShipped,
        Self::DocumentUploaded,
        Self::DocumentApproved,
        Self::DocumentRejected,
        Self::TransparencyUpdated,
        Self::CertificationExpiring,
        Self::SupplierInvited,
        Self::SystemAlert,
    ];

    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderConfirmed => "order_confirmed",
            Self::OrderShipped => "order_shipped",
            Self::DocumentUploaded => "document_uploaded",
            Self::DocumentApproved => "document_approved",
            Self::DocumentRejected => "document_rejected",
            Self::TransparencyUpdated => "transparency_updated",
            Self::CertificationExpiring => "certification_expiring",
            Self::SupplierInvited => "supplier_invited",
            Self::SystemAlert => "system_alert",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    /// Parses a known wire name; `unknown` and anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown notification type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_decodes() {
        let kind: NotificationKind = serde_json::from_str("\"carbon_report_ready\"").unwrap();
        assert_eq!(kind, NotificationKind::Unknown);
    }

    #[test]
    fn test_parses_known_names_only() {
        assert_eq!(
            "system_alert".parse::<NotificationKind>(),
            Ok(NotificationKind::SystemAlert)
        );
        assert!("unknown".parse::<NotificationKind>().is_err());
        assert!("SystemAlert".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_wire_name_matches_as_str() {
        let json = serde_json::to_string(&NotificationKind::TransparencyUpdated).unwrap();
        assert_eq!(json, format!("\"{}\"", NotificationKind::TransparencyUpdated.as_str()));
    }
}
