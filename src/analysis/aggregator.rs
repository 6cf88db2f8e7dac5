//! Trip statistics aggregation.
//!
//! This module provides the single-pass reduction that turns a sequence of
//! trip records into the flat [`Statistics`] record. The traversal order is
//! trip, then load, then order, then order position; the report generator
//! walks the same order when narrating the arithmetic.

use crate::models::{Statistics, TripRecord};

/// Working sums that feed the derived averages but are not part of the
/// statistics record itself.
#[derive(Debug, Default)]
struct RunningTotals {
    /// Sum of planned shift minutes across all trucks.
    shift_time: f64,
    /// Sum of per-load payload utilization percentages (gated loads only).
    payload_utilization_sum: f64,
    /// Number of loads that passed the payload gate.
    payload_samples: u32,
    /// Total number of trucks seen.
    trucks: u32,
}

/// Compute the statistics record for a sequence of trip records.
///
/// Pure and total: missing fields default per the rules in
/// [`crate::models`], every ratio is division-guarded, and no input makes
/// this panic. Distances are accumulated in kilometers regardless of the
/// display unit; unit conversion is formatting-only.
pub fn calculate_statistics(trips: &[TripRecord]) -> Statistics {
    let mut stats = Statistics::default();
    let mut totals = RunningTotals::default();

    for trip in trips {
        totals.trucks += 1;

        stats.total_used_time += trip.shift_used_duration();
        totals.shift_time += trip.shift_duration();

        // A non-empty load list is the only planned/unplanned signal;
        // shift duration plays no part in the classification.
        let loads = trip.loads();
        if loads.is_empty() {
            stats.un_planned_trucks += 1;
            continue;
        }
        stats.planned_trucks += 1;

        for load in loads {
            stats.number_of_trips += 1;

            stats.total_used_kms += load.total_km();
            stats.way_back_km += load.way_back_km();

            if let Some(utilization) = load.payload_utilization() {
                totals.payload_utilization_sum += utilization;
                totals.payload_samples += 1;
            }

            for order in load.orders() {
                stats.planned_orders += 1;

                // The preplanned flag lives on the load but counts once
                // per order.
                if load.preplanned() {
                    stats.preplanned_orders += 1;
                }

                for position in order.positions() {
                    let quantity = position.quantity();

                    if order.vmi() {
                        stats.total_volume_vmi += quantity;
                    } else {
                        stats.total_volume_non_vmi += quantity;

                        if load.unplanned() {
                            stats.unplanned_non_vmi_volume += quantity;
                        }
                    }
                }
            }

            // Must-go counts once per unplanned load, regardless of how
            // many orders it carried.
            if load.unplanned() {
                stats.unplanned_must_gos += 1;
            }
        }
    }

    finalize(stats, &totals)
}

/// Fill in the derived totals once the traversal is complete.
fn finalize(mut stats: Statistics, totals: &RunningTotals) -> Statistics {
    stats.total_volume = stats.total_volume_vmi + stats.total_volume_non_vmi;

    stats.average_shift_utilization = if totals.shift_time > 0.0 {
        stats.total_used_time / totals.shift_time * 100.0
    } else {
        0.0
    };

    // May go negative when used time exceeds shift time; not clamped.
    stats.average_unplanned_time_per_truck = if totals.trucks > 0 {
        (totals.shift_time - stats.total_used_time) / f64::from(totals.trucks)
    } else {
        0.0
    };

    stats.average_payload_utilization = if totals.payload_samples > 0 {
        totals.payload_utilization_sum / f64::from(totals.payload_samples)
    } else {
        0.0
    };

    stats.average_number_of_drops = if stats.number_of_trips > 0 {
        f64::from(stats.planned_orders) / f64::from(stats.number_of_trips)
    } else {
        0.0
    };

    let total_volume_m3 = stats.total_volume / 1000.0;
    stats.km_per_m3 = if total_volume_m3 > 0.0 {
        stats.total_used_kms / total_volume_m3
    } else {
        0.0
    };

    let total_used_time_hours = stats.total_used_time / 60.0;
    stats.m3_per_hour = if total_used_time_hours > 0.0 {
        total_volume_m3 / total_used_time_hours
    } else {
        0.0
    };

    // stats.delay stays zero: the field exists in the record but nothing
    // derives it yet.

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderPosition, TripEvents, TripLoad};

    fn position(quantity: f64) -> OrderPosition {
        OrderPosition {
            quantity: Some(quantity),
            product_name: Some("Diesel B7".to_string()),
        }
    }

    fn order(vmi: bool, quantities: &[f64]) -> Order {
        Order {
            is_vmi: Some(vmi),
            order_positions: Some(quantities.iter().copied().map(position).collect()),
        }
    }

    fn trip_with_loads(shift: f64, used: f64, loads: Vec<TripLoad>) -> TripRecord {
        TripRecord {
            shift_duration_in_minute: Some(shift),
            shift_used_duration_in_minute: Some(used),
            trip_events: Some(TripEvents {
                trip_load_and_orders: Some(loads),
            }),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let stats = calculate_statistics(&[]);
        assert_eq!(stats, Statistics::default());
        // No NaN can leak out of the guarded ratios
        assert!(!stats.average_shift_utilization.is_nan());
        assert!(!stats.average_unplanned_time_per_truck.is_nan());
        assert!(!stats.average_payload_utilization.is_nan());
        assert!(!stats.average_number_of_drops.is_nan());
        assert!(!stats.km_per_m3.is_nan());
        assert!(!stats.m3_per_hour.is_nan());
    }

    #[test]
    fn test_single_planned_trip_scenario() {
        let load = TripLoad {
            total_km: Some(100.0),
            customer_to_uborlp_distance_km: Some(10.0),
            is_preplanned: Some(true),
            is_unplanned_trip: Some(false),
            payload: Some(8000.0),
            max_payload: Some(10000.0),
            total_working_capacity: Some(1.0),
            orders: Some(vec![order(false, &[500.0])]),
        };
        let trips = vec![trip_with_loads(480.0, 450.0, vec![load])];

        let stats = calculate_statistics(&trips);

        assert_eq!(stats.planned_trucks, 1);
        assert_eq!(stats.un_planned_trucks, 0);
        assert_eq!(stats.number_of_trips, 1);
        assert_eq!(stats.planned_orders, 1);
        assert_eq!(stats.preplanned_orders, 1);
        assert_eq!(stats.total_volume_non_vmi, 500.0);
        assert_eq!(stats.total_volume_vmi, 0.0);
        assert_eq!(stats.total_volume, 500.0);
        assert_eq!(stats.average_payload_utilization, 80.0);
        assert_eq!(stats.total_used_kms, 100.0);
        assert_eq!(stats.way_back_km, 10.0);
        assert_eq!(stats.unplanned_must_gos, 0);
        assert_eq!(stats.unplanned_non_vmi_volume, 0.0);
    }

    #[test]
    fn test_empty_load_list_is_unplanned_truck() {
        let trips = vec![trip_with_loads(480.0, 120.0, vec![])];

        let stats = calculate_statistics(&trips);

        assert_eq!(stats.un_planned_trucks, 1);
        assert_eq!(stats.planned_trucks, 0);
        assert_eq!(stats.number_of_trips, 0);
        assert_eq!(stats.planned_orders, 0);
        assert_eq!(stats.total_volume, 0.0);
        assert_eq!(stats.total_used_kms, 0.0);
        // Shift time still feeds the time aggregates
        assert_eq!(stats.total_used_time, 120.0);
        assert_eq!(stats.average_shift_utilization, 25.0);
    }

    #[test]
    fn test_missing_trip_events_is_unplanned_truck() {
        let trips = vec![TripRecord::default()];
        let stats = calculate_statistics(&trips);
        assert_eq!(stats.un_planned_trucks, 1);
        assert_eq!(stats.planned_trucks, 0);
    }

    #[test]
    fn test_classification_is_exclusive() {
        let trips = vec![
            trip_with_loads(480.0, 400.0, vec![TripLoad::default()]),
            trip_with_loads(480.0, 0.0, vec![]),
            TripRecord::default(),
            trip_with_loads(300.0, 100.0, vec![TripLoad::default(), TripLoad::default()]),
        ];

        let stats = calculate_statistics(&trips);
        assert_eq!(
            stats.planned_trucks + stats.un_planned_trucks,
            trips.len() as u32
        );
        assert_eq!(stats.planned_trucks, 2);
        assert_eq!(stats.un_planned_trucks, 2);
        assert_eq!(stats.number_of_trips, 3);
    }

    #[test]
    fn test_volume_buckets() {
        let load = TripLoad {
            is_unplanned_trip: Some(true),
            orders: Some(vec![
                order(true, &[1000.0, 250.0]),
                order(false, &[400.0, 100.0]),
            ]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load])];

        let stats = calculate_statistics(&trips);

        assert_eq!(stats.total_volume_vmi, 1250.0);
        assert_eq!(stats.total_volume_non_vmi, 500.0);
        assert_eq!(stats.total_volume, stats.total_volume_vmi + stats.total_volume_non_vmi);
        // Unplanned load: non-VMI volume also lands in the unplanned bucket
        assert_eq!(stats.unplanned_non_vmi_volume, 500.0);
        assert!(stats.unplanned_non_vmi_volume <= stats.total_volume_non_vmi);
        assert_eq!(stats.unplanned_must_gos, 1);
    }

    #[test]
    fn test_vmi_volume_never_counts_as_unplanned() {
        let load = TripLoad {
            is_unplanned_trip: Some(true),
            orders: Some(vec![order(true, &[1000.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.total_volume_vmi, 1000.0);
        assert_eq!(stats.unplanned_non_vmi_volume, 0.0);
    }

    #[test]
    fn test_preplanned_counts_once_per_order() {
        let load = TripLoad {
            is_preplanned: Some(true),
            orders: Some(vec![order(false, &[100.0]), order(false, &[200.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.planned_orders, 2);
        assert_eq!(stats.preplanned_orders, 2);
    }

    #[test]
    fn test_preplanned_requires_explicit_true() {
        // A load without the flag contributes orders but no preplanned count
        let load = TripLoad {
            orders: Some(vec![order(false, &[100.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.planned_orders, 1);
        assert_eq!(stats.preplanned_orders, 0);
    }

    #[test]
    fn test_must_go_counts_per_load_not_per_order() {
        let load = TripLoad {
            is_unplanned_trip: Some(true),
            orders: Some(vec![
                order(false, &[100.0]),
                order(false, &[200.0]),
                order(false, &[300.0]),
            ]),
            ..Default::default()
        };
        let bare_unplanned = TripLoad {
            is_unplanned_trip: Some(true),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load, bare_unplanned])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.unplanned_must_gos, 2);
    }

    #[test]
    fn test_payload_average_excludes_gated_out_loads() {
        let gated = TripLoad {
            payload: Some(18000.0),
            max_payload: Some(24000.0),
            total_working_capacity: Some(26000.0),
            ..Default::default()
        };
        let no_capacity = TripLoad {
            payload: Some(5000.0),
            max_payload: Some(24000.0),
            total_working_capacity: Some(0.0),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![gated, no_capacity])];

        let stats = calculate_statistics(&trips);
        // Only the gated load participates: round(75) / 1, not / 2
        assert_eq!(stats.average_payload_utilization, 75.0);
    }

    #[test]
    fn test_drops_ratio() {
        let stats = calculate_statistics(&[]);
        assert_eq!(stats.average_number_of_drops, 0.0);

        let load_two_orders = TripLoad {
            orders: Some(vec![order(false, &[100.0]), order(false, &[200.0])]),
            ..Default::default()
        };
        let load_one_order = TripLoad {
            orders: Some(vec![order(false, &[300.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 480.0, vec![load_two_orders, load_one_order])];

        let stats = calculate_statistics(&trips);
        let expected = f64::from(stats.planned_orders) / f64::from(stats.number_of_trips);
        assert!((stats.average_number_of_drops - expected).abs() < 1e-9);
        assert_eq!(stats.average_number_of_drops, 1.5);
    }

    #[test]
    fn test_negative_unplanned_time_is_not_clamped() {
        // Used time exceeds shift time
        let trips = vec![trip_with_loads(480.0, 510.0, vec![])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.average_unplanned_time_per_truck, -30.0);
        assert!(stats.average_shift_utilization > 100.0);
    }

    #[test]
    fn test_derived_ratios() {
        let load = TripLoad {
            total_km: Some(120.0),
            orders: Some(vec![order(false, &[6000.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 240.0, vec![load])];

        let stats = calculate_statistics(&trips);
        // 120 km over 6 m³
        assert!((stats.km_per_m3 - 20.0).abs() < 1e-9);
        // 6 m³ over 4 hours
        assert!((stats.m3_per_hour - 1.5).abs() < 1e-9);
        assert_eq!(stats.average_shift_utilization, 50.0);
    }

    #[test]
    fn test_sample_dataset_statistics() {
        let trips = crate::input::sample_trips().unwrap();
        let stats = calculate_statistics(&trips);

        assert_eq!(stats.planned_trucks, 2);
        assert_eq!(stats.un_planned_trucks, 2);
        assert_eq!(stats.number_of_trips, 4);
        assert_eq!(stats.planned_orders, 4);
        assert_eq!(stats.preplanned_orders, 3);
        assert_eq!(stats.unplanned_must_gos, 2);

        assert_eq!(stats.total_volume_vmi, 6000.0);
        assert_eq!(stats.total_volume_non_vmi, 15300.0);
        assert_eq!(stats.total_volume, 21300.0);
        assert_eq!(stats.unplanned_non_vmi_volume, 3100.0);

        // round(75) + round(83.33) + round(39.58) over 3 gated loads;
        // the capacity-less load is excluded
        assert_eq!(stats.average_payload_utilization, 66.0);

        assert_eq!(stats.total_used_time, 960.0);
        assert!((stats.total_used_kms - 312.6).abs() < 1e-9);
        assert!((stats.way_back_km - 43.3).abs() < 1e-9);

        // 960 used over 1860 planned minutes, across 4 trucks
        assert!((stats.average_shift_utilization - 51.612903225806448).abs() < 1e-9);
        assert_eq!(stats.average_unplanned_time_per_truck, 225.0);
        assert_eq!(stats.average_number_of_drops, 1.0);
        assert_eq!(stats.delay, 0.0);
    }

    #[test]
    fn test_delay_is_always_zero() {
        let load = TripLoad {
            total_km: Some(100.0),
            orders: Some(vec![order(false, &[500.0])]),
            ..Default::default()
        };
        let trips = vec![trip_with_loads(480.0, 600.0, vec![load])];

        let stats = calculate_statistics(&trips);
        assert_eq!(stats.delay, 0.0);
    }
}
