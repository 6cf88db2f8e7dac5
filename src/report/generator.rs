//! Calculation explanation and report rendering.
//!
//! This module generates the step-by-step textual derivation of every
//! statistic. It re-walks the trip records in the exact traversal order of
//! the aggregator (trip, load, order, position) and recomputes the raw sums
//! independently as a built-in cross-check, but every derived ratio on a
//! formula line is taken verbatim from the [`Statistics`] record so the
//! narration can never drift from the official numbers.

use crate::format::{display_distance, format_hours_minutes, NOT_AVAILABLE};
use crate::models::{DistanceUnit, Report, Statistics, TripRecord};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Raw sums recomputed by the narration passes.
///
/// Filled in section order: the counting section provides the counts, the
/// shift time and the payload sums; the volume section provides the volume
/// buckets; the time/distance section provides the used time and distances.
#[derive(Debug, Default)]
struct TraceTotals {
    trucks: usize,
    planned_trucks: u32,
    unplanned_trucks: u32,
    loads: u32,
    orders: u32,
    preplanned_orders: u32,
    shift_time: f64,
    used_time: f64,
    payload_utilization_sum: f64,
    payload_samples: u32,
    vmi_volume: f64,
    non_vmi_volume: f64,
    unplanned_non_vmi_volume: f64,
    used_kms: f64,
    way_back_km: f64,
}

/// Render a kilometer value as a display-unit distance with one decimal.
fn trace_distance(km: f64, unit: DistanceUnit) -> String {
    match display_distance(Some(km), unit) {
        Some(converted) => format!("{:.1} {}", converted, unit.label()),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Generate the complete calculation explanation.
pub fn generate_explanation_report(
    trips: &[TripRecord],
    stats: &Statistics,
    unit: DistanceUnit,
) -> String {
    let mut totals = TraceTotals::default();
    let mut output = String::new();

    output.push_str("DETAILED MATHEMATICAL CALCULATION EXPLANATION\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    output.push_str(&generate_input_section(trips));
    output.push_str(&generate_counting_section(trips, unit, &mut totals));
    output.push_str(&generate_volume_section(trips, &mut totals));
    output.push_str(&generate_time_distance_section(trips, unit, &mut totals));
    output.push_str(&generate_derived_section(&totals, stats, unit));
    output.push_str(&generate_summary_section(stats, unit));

    output
}

/// Generate the input analysis section.
fn generate_input_section(trips: &[TripRecord]) -> String {
    let mut section = String::new();

    section.push_str("INPUT DATA ANALYSIS:\n");
    section.push_str(&format!("- Total number of trip records: {}\n\n", trips.len()));

    section
}

/// Generate Step 1: the per-trip counting trace.
fn generate_counting_section(
    trips: &[TripRecord],
    unit: DistanceUnit,
    totals: &mut TraceTotals,
) -> String {
    let mut section = String::new();

    section.push_str("STEP 1: BASIC COUNTING CALCULATIONS\n");
    section.push_str(&"-".repeat(40));
    section.push('\n');
    section.push_str("Iterating through each trip record:\n");

    for (i, trip) in trips.iter().enumerate() {
        totals.trucks += 1;

        let loads = trip.loads();

        section.push_str(&format!("\nTrip {}:\n", i + 1));
        section.push_str(&format!("  - Shift Duration: {} minutes\n", trip.shift_duration()));
        section.push_str(&format!(
            "  - Shift Used Duration: {} minutes\n",
            trip.shift_used_duration()
        ));
        section.push_str(&format!("  - Number of trip loads: {}\n", loads.len()));

        totals.shift_time += trip.shift_duration();

        if loads.is_empty() {
            totals.unplanned_trucks += 1;
            section.push_str("  → Classified as UNPLANNED TRUCK\n");
            continue;
        }

        totals.planned_trucks += 1;
        section.push_str("  → Classified as PLANNED TRUCK\n");

        for (j, load) in loads.iter().enumerate() {
            totals.loads += 1;

            section.push_str(&format!("    Trip Load {}:\n", j + 1));
            section.push_str(&format!(
                "      - Total Distance: {}\n",
                trace_distance(load.total_km(), unit)
            ));
            section.push_str(&format!(
                "      - Customer to UB/LP Distance: {}\n",
                trace_distance(load.way_back_km(), unit)
            ));
            section.push_str(&format!("      - Is Preplanned: {}\n", load.preplanned()));
            section.push_str(&format!("      - Number of orders: {}\n", load.orders().len()));

            if let Some(utilization) = load.payload_utilization() {
                totals.payload_utilization_sum += utilization;
                totals.payload_samples += 1;
                section.push_str(&format!(
                    "      - Payload Utilization: ({} / {}) × 100 = {}%\n",
                    load.payload.unwrap_or(0.0),
                    load.max_payload.unwrap_or(0.0),
                    utilization
                ));
            }

            totals.orders += load.orders().len() as u32;
            if load.preplanned() {
                totals.preplanned_orders += load.orders().len() as u32;
            }
        }
    }

    section.push_str("\nCOUNTING RESULTS:\n");
    section.push_str(&format!("- Planned Trucks = {}\n", totals.planned_trucks));
    section.push_str(&format!("- Unplanned Trucks = {}\n", totals.unplanned_trucks));
    section.push_str(&format!("- Total Trips = {}\n", totals.loads));
    section.push_str(&format!("- Total Orders = {}\n", totals.orders));
    section.push_str(&format!("- Preplanned Orders = {}\n\n", totals.preplanned_orders));

    section
}

/// Generate Step 2: the per-position volume trace.
fn generate_volume_section(trips: &[TripRecord], totals: &mut TraceTotals) -> String {
    let mut section = String::new();

    section.push_str("STEP 2: VOLUME CALCULATIONS\n");
    section.push_str(&"-".repeat(40));
    section.push('\n');
    section.push_str("Calculating volumes by iterating through order positions:\n");

    for (i, trip) in trips.iter().enumerate() {
        for (j, load) in trip.loads().iter().enumerate() {
            for (k, order) in load.orders().iter().enumerate() {
                section.push_str(&format!(
                    "\nTrip {}, Load {}, Order {} (VMI: {}):\n",
                    i + 1,
                    j + 1,
                    k + 1,
                    order.vmi()
                ));

                for (l, position) in order.positions().iter().enumerate() {
                    let quantity = position.quantity();

                    section.push_str(&format!(
                        "  - Position {}: {}L ({})\n",
                        l + 1,
                        quantity,
                        position.product_label()
                    ));

                    if order.vmi() {
                        totals.vmi_volume += quantity;
                        section.push_str("    → Added to VMI Volume\n");
                    } else {
                        totals.non_vmi_volume += quantity;
                        section.push_str("    → Added to Non-VMI Volume\n");

                        if load.unplanned() {
                            totals.unplanned_non_vmi_volume += quantity;
                            section.push_str("    → Also added to Unplanned Non-VMI Volume\n");
                        }
                    }
                }
            }
        }
    }

    section.push_str("\nVOLUME CALCULATION RESULTS:\n");
    section.push_str(&format!("- Total VMI Volume = {}L\n", totals.vmi_volume));
    section.push_str(&format!("- Total Non-VMI Volume = {}L\n", totals.non_vmi_volume));
    section.push_str(&format!(
        "- Total Volume = {} + {} = {}L\n",
        totals.vmi_volume,
        totals.non_vmi_volume,
        totals.vmi_volume + totals.non_vmi_volume
    ));
    section.push_str(&format!(
        "- Unplanned Non-VMI Volume = {}L\n\n",
        totals.unplanned_non_vmi_volume
    ));

    section
}

/// Generate Step 3: the time and distance re-summation.
fn generate_time_distance_section(
    trips: &[TripRecord],
    unit: DistanceUnit,
    totals: &mut TraceTotals,
) -> String {
    let mut section = String::new();

    section.push_str("STEP 3: TIME AND DISTANCE CALCULATIONS\n");
    section.push_str(&"-".repeat(40));
    section.push('\n');

    for trip in trips {
        totals.used_time += trip.shift_used_duration();

        for load in trip.loads() {
            totals.used_kms += load.total_km();
            totals.way_back_km += load.way_back_km();
        }
    }

    section.push_str(&format!(
        "Total Used Time = Sum of all shiftUsedDurationInMinute = {} minutes ({})\n",
        totals.used_time,
        format_hours_minutes(Some(totals.used_time))
    ));
    section.push_str(&format!(
        "Total Shift Time = Sum of all shiftDurationInMinute = {} minutes ({})\n",
        totals.shift_time,
        format_hours_minutes(Some(totals.shift_time))
    ));
    section.push_str(&format!(
        "Total Used Distance = Sum of all totalKM = {} km = {}\n",
        totals.used_kms,
        trace_distance(totals.used_kms, unit)
    ));
    section.push_str(&format!(
        "Way Back Distance = Sum of all customerToUBORLPDistanceKM = {} km = {}\n\n",
        totals.way_back_km,
        trace_distance(totals.way_back_km, unit)
    ));

    section
}

/// Generate Step 4: each derived formula substituted with concrete numbers.
///
/// The raw operands come from the recomputed trace totals; the result of
/// every formula is echoed from the statistics record.
fn generate_derived_section(
    totals: &TraceTotals,
    stats: &Statistics,
    unit: DistanceUnit,
) -> String {
    let mut section = String::new();

    section.push_str("STEP 4: AVERAGE AND DERIVED CALCULATIONS\n");
    section.push_str(&"-".repeat(40));
    section.push('\n');

    section.push_str("Average Shift Utilization:\n");
    section.push_str("= (Total Used Time / Total Shift Time) × 100\n");
    section.push_str(&format!(
        "= ({} / {}) × 100 = {:.2}%\n\n",
        totals.used_time, totals.shift_time, stats.average_shift_utilization
    ));

    section.push_str("Average Unplanned Time per Truck:\n");
    section.push_str("= (Total Shift Time - Total Used Time) / Total Trucks\n");
    section.push_str(&format!(
        "= ({} - {}) / {} = {:.2} minutes\n\n",
        totals.shift_time, totals.used_time, totals.trucks, stats.average_unplanned_time_per_truck
    ));

    section.push_str("Average Payload Utilization:\n");
    section.push_str("= Sum of per-load payload utilizations / Loads with payload data\n");
    section.push_str(&format!(
        "= {} / {} = {:.2}%\n\n",
        totals.payload_utilization_sum, totals.payload_samples, stats.average_payload_utilization
    ));

    section.push_str("Average Number of Drops:\n");
    section.push_str("= Total Orders / Total Trips\n");
    section.push_str(&format!(
        "= {} / {} = {:.2}\n\n",
        totals.orders, totals.loads, stats.average_number_of_drops
    ));

    let total_volume = totals.vmi_volume + totals.non_vmi_volume;
    let total_volume_m3 = total_volume / 1000.0;
    let converted_distance = unit.from_km(totals.used_kms);
    let converted_km_per_m3 = unit.from_km(stats.km_per_m3);

    section.push_str(&format!("{} Calculation:\n", unit.per_volume_label()));
    section.push_str("= Total Used Distance / Total Volume in m³\n");
    section.push_str(&format!(
        "= {} km ({:.1} {}) / ({} / 1000)\n",
        totals.used_kms,
        converted_distance,
        unit.label(),
        total_volume
    ));
    section.push_str(&format!(
        "= {:.1} / {:.3} = {:.2} {}\n\n",
        converted_distance,
        total_volume_m3,
        converted_km_per_m3,
        unit.per_volume_label()
    ));

    let total_used_time_hours = totals.used_time / 60.0;
    section.push_str("m³/hour Calculation:\n");
    section.push_str("= Total Volume in m³ / Total Used Time in hours\n");
    section.push_str(&format!(
        "= {:.3} / ({} / 60)\n",
        total_volume_m3, totals.used_time
    ));
    section.push_str(&format!(
        "= {:.3} / {:.2} = {:.2} m³/hour\n\n",
        total_volume_m3, total_used_time_hours, stats.m3_per_hour
    ));

    section
}

/// Generate the final summary: a verbatim echo of every statistics field.
fn generate_summary_section(stats: &Statistics, unit: DistanceUnit) -> String {
    let mut section = String::new();

    section.push_str("FINAL CALCULATED STATISTICS SUMMARY:\n");
    section.push_str(&"=".repeat(60));
    section.push('\n');

    section.push_str(&format!("Planned Trucks: {}\n", stats.planned_trucks));
    section.push_str(&format!("Number of Trips: {}\n", stats.number_of_trips));
    section.push_str(&format!("Planned Orders: {}\n", stats.planned_orders));
    section.push_str(&format!("Preplanned Orders: {}\n", stats.preplanned_orders));
    section.push_str(&format!("Unplanned Trucks: {}\n", stats.un_planned_trucks));
    section.push_str(&format!("Unplanned Must-Go's: {}\n", stats.unplanned_must_gos));
    section.push_str(&format!("Total Volume: {}L\n", stats.total_volume));
    section.push_str(&format!("Total Volume VMI Orders: {}L\n", stats.total_volume_vmi));
    section.push_str(&format!(
        "Total Volume Non-VMI Orders: {}L\n",
        stats.total_volume_non_vmi
    ));
    section.push_str(&format!(
        "Unplanned Non-VMI Volume: {}L\n",
        stats.unplanned_non_vmi_volume
    ));
    section.push_str(&format!(
        "Average Payload Utilization: {:.2}%\n",
        stats.average_payload_utilization
    ));
    section.push_str(&format!(
        "Average Shift Utilization: {:.2}%\n",
        stats.average_shift_utilization
    ));
    section.push_str(&format!(
        "Average Unplanned Time per Truck: {}\n",
        format_hours_minutes(Some(stats.average_unplanned_time_per_truck))
    ));
    section.push_str(&format!(
        "Average Number of Drops: {:.2}\n",
        stats.average_number_of_drops
    ));
    section.push_str(&format!(
        "Total Used Time: {}\n",
        format_hours_minutes(Some(stats.total_used_time))
    ));
    section.push_str(&format!("Delay: {}\n", format_hours_minutes(Some(stats.delay))));
    section.push_str(&format!(
        "Total Used Distance: {}\n",
        trace_distance(stats.total_used_kms, unit)
    ));
    section.push_str(&format!(
        "Way Back Distance: {}\n",
        trace_distance(stats.way_back_km, unit)
    ));
    section.push_str(&format!(
        "{}: {:.2}\n",
        unit.per_volume_label(),
        unit.from_km(stats.km_per_m3)
    ));
    section.push_str(&format!("m³/hour: {:.2}\n", stats.m3_per_hour));

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
