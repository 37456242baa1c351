// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Livery workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a quote/booking record.
///
/// `pending`, `contacted`, and `quoted` are collectively "unconfirmed";
/// only those states may transition to `confirmed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Contacted,
    Quoted,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// True for states that may still transition to `confirmed`.
    pub fn is_unconfirmed(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Contacted | BookingStatus::Quoted
        )
    }
}

/// Directional half of a split return-trip booking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripLeg {
    Outbound,
    Return,
}

/// One leg of a return trip as submitted by the quote form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegDetails {
    pub pickup: String,
    #[serde(default)]
    pub destinations: Vec<String>,
    pub date: String,
    pub time: String,
    #[serde(
        rename = "cityDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub city_date_time: Option<String>,
}

impl LegDetails {
    /// The dropoff for this leg: the last waypoint, if any.
    pub fn last_destination(&self) -> Option<&str> {
        self.destinations.last().map(String::as_str)
    }
}

/// Discriminator literal carried by the structured return-trip shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnTripTag {
    #[serde(rename = "return_trip")]
    ReturnTrip,
}

/// The structured return-trip variant of [`Destinations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTrip {
    #[serde(rename = "type")]
    pub tag: ReturnTripTag,
    pub outbound: LegDetails,
    #[serde(rename = "return")]
    pub return_leg: LegDetails,
}

impl ReturnTrip {
    pub fn new(outbound: LegDetails, return_leg: LegDetails) -> Self {
        Self {
            tag: ReturnTripTag::ReturnTrip,
            outbound,
            return_leg,
        }
    }
}

/// Polymorphic destinations field of a quote record.
///
/// Exactly one shape is valid per record: a flat ordered waypoint list
/// for a single-leg trip, or the structured outbound/return pair. Code
/// must match on this enum before touching any leg field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destinations {
    ReturnTrip(ReturnTrip),
    SingleLeg(Vec<String>),
}

impl Default for Destinations {
    fn default() -> Self {
        Destinations::SingleLeg(Vec::new())
    }
}

impl Destinations {
    pub fn is_return_trip(&self) -> bool {
        matches!(self, Destinations::ReturnTrip(_))
    }

    /// Waypoints of a single-leg trip; `None` for the return-trip shape.
    pub fn single_leg(&self) -> Option<&[String]> {
        match self {
            Destinations::SingleLeg(stops) => Some(stops),
            Destinations::ReturnTrip(_) => None,
        }
    }
}

/// Lifecycle state of a marketing campaign.
///
/// `draft` is the only state from which a send may start; `sent` and
/// `failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Sent,
    Failed,
}

/// Built-in audience segment predicates.
///
/// One predicate per resolution; predicates are not combinable with
/// each other, only with the optional [`CustomFilter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// status = cancelled.
    Cancelled,
    /// status in {contacted, quoted} and created more than 7 days ago.
    Lost,
    /// status = pending and created more than 3 days ago.
    PendingOld,
    /// status in {confirmed, completed}.
    PastCustomers,
    /// quoted_price > 200.
    HighValue,
    /// service_type contains "airport" (case-insensitive).
    Airport,
    /// service_type contains "corporate" (case-insensitive).
    Corporate,
    /// No filter.
    AllLeads,
    /// Active rows from the email_subscriptions table.
    EmailSubscribers,
}

/// Optional extra conditions ANDed onto a segment predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Inclusive lower bound on created_at, canonical timestamp format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    /// Exclusive upper bound on created_at, canonical timestamp format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
}

impl CustomFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }
}

/// A marketing contact produced by the segmentation engine.
///
/// Quote-derived contacts carry name and phone when known; contacts
/// drawn from the subscriptions table are email-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_status_round_trips_as_lowercase() {
        use std::str::FromStr;

        for status in [
            BookingStatus::Pending,
            BookingStatus::Contacted,
            BookingStatus::Quoted,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let s = status.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(BookingStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn unconfirmed_states_are_exactly_three() {
        assert!(BookingStatus::Pending.is_unconfirmed());
        assert!(BookingStatus::Contacted.is_unconfirmed());
        assert!(BookingStatus::Quoted.is_unconfirmed());
        assert!(!BookingStatus::Confirmed.is_unconfirmed());
        assert!(!BookingStatus::Cancelled.is_unconfirmed());
        assert!(!BookingStatus::Completed.is_unconfirmed());
    }

    #[test]
    fn destinations_flat_list_deserializes_as_single_leg() {
        let parsed: Destinations = serde_json::from_str(r#"["B","C"]"#).unwrap();
        assert_eq!(
            parsed,
            Destinations::SingleLeg(vec!["B".to_string(), "C".to_string()])
        );
        assert!(!parsed.is_return_trip());
    }

    #[test]
    fn destinations_return_trip_shape_deserializes() {
        let json = r#"{
            "type": "return_trip",
            "outbound": {"pickup": "A", "destinations": ["B", "C"], "date": "2026-09-01", "time": "10:00"},
            "return": {"pickup": "C", "destinations": ["A"], "date": "2026-09-03", "time": "18:30", "cityDateTime": "2026-09-03 18:30"}
        }"#;
        let parsed: Destinations = serde_json::from_str(json).unwrap();
        let Destinations::ReturnTrip(rt) = parsed else {
            panic!("expected return-trip shape");
        };
        assert_eq!(rt.outbound.pickup, "A");
        assert_eq!(rt.outbound.last_destination(), Some("C"));
        assert_eq!(rt.return_leg.pickup, "C");
        assert_eq!(
            rt.return_leg.city_date_time.as_deref(),
            Some("2026-09-03 18:30")
        );
    }

    #[test]
    fn return_trip_serializes_with_type_and_return_keys() {
        let rt = ReturnTrip::new(
            LegDetails {
                pickup: "A".into(),
                destinations: vec!["B".into()],
                date: "2026-09-01".into(),
                time: "10:00".into(),
                city_date_time: None,
            },
            LegDetails {
                pickup: "B".into(),
                destinations: vec!["A".into()],
                date: "2026-09-02".into(),
                time: "09:00".into(),
                city_date_time: None,
            },
        );
        let json = serde_json::to_value(Destinations::ReturnTrip(rt)).unwrap();
        assert_eq!(json["type"], "return_trip");
        assert!(json.get("return").is_some());
        assert!(json.get("return_leg").is_none());
    }

    #[test]
    fn segments_round_trip_as_snake_case() {
        use std::str::FromStr;

        for segment in [
            Segment::Cancelled,
            Segment::Lost,
            Segment::PendingOld,
            Segment::PastCustomers,
            Segment::HighValue,
            Segment::Airport,
            Segment::Corporate,
            Segment::AllLeads,
            Segment::EmailSubscribers,
        ] {
            let s = segment.to_string();
            assert_eq!(Segment::from_str(&s).unwrap(), segment);
        }
        assert_eq!(Segment::PendingOld.to_string(), "pending_old");
        assert_eq!(Segment::EmailSubscribers.to_string(), "email_subscribers");
    }

    #[test]
    fn campaign_status_draft_is_lowercase() {
        assert_eq!(CampaignStatus::Draft.to_string(), "draft");
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Sending).unwrap(),
            "\"sending\""
        );
    }

    #[test]
    fn malformed_destinations_object_is_rejected() {
        // An object without the return_trip discriminator must not parse.
        let err = serde_json::from_str::<Destinations>(r#"{"outbound": {}}"#);
        assert!(err.is_err());
    }
}
