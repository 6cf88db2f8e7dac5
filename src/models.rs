//! Data models for the trip statistics calculator.
//!
//! This module contains the input entities deserialized from trip data JSON,
//! the computed statistics record, and the report structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance unit used for display formatting.
///
/// Statistics always store distances in kilometers; the unit only affects
/// how distances are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Kilometers (default)
    #[default]
    Km,
    /// Miles
    Miles,
}

impl DistanceUnit {
    /// Parse a unit selector leniently.
    ///
    /// Only the exact string `"miles"` selects miles; every other value
    /// (including unknown selectors) falls back to kilometers. Unknown
    /// units are never an error.
    pub fn parse(s: &str) -> Self {
        if s == "miles" {
            DistanceUnit::Miles
        } else {
            DistanceUnit::Km
        }
    }

    /// Returns the display label for this unit.
    pub fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Miles => "miles",
        }
    }

    /// Returns the distance-per-volume label for this unit.
    pub fn per_volume_label(&self) -> &'static str {
        match self {
            DistanceUnit::Km => "km/m³",
            DistanceUnit::Miles => "miles/m³",
        }
    }

    /// Convert a kilometer value into this unit.
    pub fn from_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Km => km,
            DistanceUnit::Miles => crate::format::km_to_miles(km),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One trip record: a vehicle and its shift.
///
/// Every field is optional in the input; missing numeric fields count as
/// zero and a missing event block means the truck ran no loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Planned shift length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_duration_in_minute: Option<f64>,
    /// Shift time actually used, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_used_duration_in_minute: Option<f64>,
    /// Events recorded for this trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_events: Option<TripEvents>,
}

impl TripRecord {
    /// Planned shift length; missing counts as zero.
    pub fn shift_duration(&self) -> f64 {
        self.shift_duration_in_minute.unwrap_or(0.0)
    }

    /// Used shift time; missing counts as zero.
    pub fn shift_used_duration(&self) -> f64 {
        self.shift_used_duration_in_minute.unwrap_or(0.0)
    }

    /// The trip loads for this truck. Missing event data means no loads.
    pub fn loads(&self) -> &[TripLoad] {
        self.trip_events
            .as_ref()
            .and_then(|events| events.trip_load_and_orders.as_deref())
            .unwrap_or(&[])
    }
}

/// Event data attached to a trip record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripEvents {
    /// Ordered sequence of delivery runs within the shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_load_and_orders: Option<Vec<TripLoad>>,
}

/// One delivery run within a truck's shift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLoad {
    /// Total distance driven, in kilometers.
    #[serde(default, rename = "totalKM", skip_serializing_if = "Option::is_none")]
    pub total_km: Option<f64>,
    /// Return-leg distance from the last customer, in kilometers.
    #[serde(
        default,
        rename = "customerToUBORLPDistanceKM",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_to_uborlp_distance_km: Option<f64>,
    /// Preplanned flag. Only an explicit `true` counts (strict check).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_preplanned: Option<bool>,
    /// Unplanned-trip flag. Only an explicit `true` counts (strict check).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unplanned_trip: Option<bool>,
    /// Actual payload carried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<f64>,
    /// Maximum payload of the vehicle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<f64>,
    /// Total working capacity of the vehicle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_working_capacity: Option<f64>,
    /// Orders delivered on this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
}

impl TripLoad {
    /// Total distance; missing counts as zero.
    pub fn total_km(&self) -> f64 {
        self.total_km.unwrap_or(0.0)
    }

    /// Return-leg distance; missing counts as zero.
    pub fn way_back_km(&self) -> f64 {
        self.customer_to_uborlp_distance_km.unwrap_or(0.0)
    }

    /// Strict flag rule: a load is preplanned only when the input carries
    /// an explicit `true`. A missing flag does not count.
    pub fn preplanned(&self) -> bool {
        self.is_preplanned == Some(true)
    }

    /// Strict flag rule: a load is an unplanned trip only when the input
    /// carries an explicit `true`. A missing flag does not count.
    pub fn unplanned(&self) -> bool {
        self.is_unplanned_trip == Some(true)
    }

    /// The orders of this load; missing counts as empty.
    pub fn orders(&self) -> &[Order] {
        self.orders.as_deref().unwrap_or(&[])
    }

    /// Per-load payload utilization in whole percent.
    ///
    /// Computed only when both `totalWorkingCapacity` and `maxPayload` are
    /// positive; loads failing the gate return `None` and are excluded from
    /// the average entirely (not treated as zero). Rounding happens here,
    /// per load, not at the average.
    pub fn payload_utilization(&self) -> Option<f64> {
        let capacity = self.total_working_capacity.unwrap_or(0.0);
        let max_payload = self.max_payload.unwrap_or(0.0);

        if capacity > 0.0 && max_payload > 0.0 {
            Some((self.payload.unwrap_or(0.0) / max_payload * 100.0).round())
        } else {
            None
        }
    }
}

/// One customer order within a load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Vendor-managed-inventory flag; routes volume into the VMI bucket.
    #[serde(default, rename = "isVMI", skip_serializing_if = "Option::is_none")]
    pub is_vmi: Option<bool>,
    /// Line items of this order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_positions: Option<Vec<OrderPosition>>,
}

impl Order {
    /// Truthy flag rule: a missing `isVMI` counts as non-VMI.
    pub fn vmi(&self) -> bool {
        self.is_vmi.unwrap_or(false)
    }

    /// The order positions; missing counts as empty.
    pub fn positions(&self) -> &[OrderPosition] {
        self.order_positions.as_deref().unwrap_or(&[])
    }
}

/// One line item of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPosition {
    /// Delivered quantity in liters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Product name, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl OrderPosition {
    /// Delivered quantity; missing counts as zero.
    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    /// Product name for trace lines.
    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Unknown")
    }
}

/// The computed statistics record.
///
/// Produced once per calculation and immutable afterwards. Field names
/// serialize with the exact key spelling of the upstream trip data system
/// (`unPlannedTrucks`, `totalVolumeVMI`, `totalUsedKMs`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Trucks with at least one load.
    pub planned_trucks: u32,
    /// Total number of loads across all trucks.
    pub number_of_trips: u32,
    /// Total number of orders across all loads.
    pub planned_orders: u32,
    /// Orders belonging to a load flagged preplanned.
    pub preplanned_orders: u32,
    /// Trucks with an empty load list.
    pub un_planned_trucks: u32,
    /// Loads flagged as unplanned trips (must-go runs).
    pub unplanned_must_gos: u32,
    /// Total delivered volume in liters (VMI + non-VMI).
    pub total_volume: f64,
    /// Delivered volume of VMI orders, in liters.
    #[serde(rename = "totalVolumeVMI")]
    pub total_volume_vmi: f64,
    /// Delivered volume of non-VMI orders, in liters.
    #[serde(rename = "totalVolumeNonVMI")]
    pub total_volume_non_vmi: f64,
    /// Non-VMI volume delivered on unplanned loads, in liters.
    #[serde(rename = "unplannedNonVMIVolume")]
    pub unplanned_non_vmi_volume: f64,
    /// Average of per-load payload utilization percentages.
    pub average_payload_utilization: f64,
    /// Used shift time over planned shift time, in percent.
    pub average_shift_utilization: f64,
    /// Unused shift minutes per truck. Negative when used time exceeds
    /// shift time; deliberately not clamped.
    pub average_unplanned_time_per_truck: f64,
    /// Orders per load.
    pub average_number_of_drops: f64,
    /// Sum of used shift time in minutes.
    pub total_used_time: f64,
    /// Placeholder, never derived from the traversal; always zero.
    pub delay: f64,
    /// Sum of driven distance in kilometers.
    #[serde(rename = "totalUsedKMs")]
    pub total_used_kms: f64,
    /// Sum of return-leg distance in kilometers.
    pub way_back_km: f64,
    /// Driven kilometers per cubic meter of delivered volume.
    pub km_per_m3: f64,
    /// Delivered cubic meters per hour of used shift time.
    pub m3_per_hour: f64,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// Number of trip records in the input.
    pub trip_count: usize,
    /// Distance unit used for display formatting.
    pub distance_unit: DistanceUnit,
    /// Duration of the calculation in seconds.
    pub duration_seconds: f64,
}

/// The complete statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// The computed statistics.
    pub statistics: Statistics,
    /// The step-by-step calculation explanation, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
