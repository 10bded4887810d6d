//! Influence lines and vehicle placement

use crate::analysis::Optimization;
use crate::loads::{LiveLoadModel, VehicularLoad, VehicularLoadConfiguration};
use crate::results::{AxleConfiguration, AxlePlacement, Face};
use crate::solution::POSITION_TOLERANCE;

/// Value of an influence line at one location, with the limits approaching
/// from either side
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InfluencePoint {
    pub x: f64,
    pub left: f64,
    pub right: f64,
}

impl InfluencePoint {
    pub fn continuous(x: f64, value: f64) -> Self {
        Self {
            x,
            left: value,
            right: value,
        }
    }

    fn is_continuous(&self) -> bool {
        (self.left - self.right).abs() <= f64::EPSILON * self.left.abs().max(1.0)
    }

    fn face(&self, side: Face) -> f64 {
        match side {
            Face::Left => self.left,
            Face::Right => self.right,
        }
    }
}

/// Piecewise linear influence line over the active structure
#[derive(Debug, Clone, Default)]
pub(crate) struct InfluenceLine {
    points: Vec<InfluencePoint>,
}

impl InfluenceLine {
    pub fn new(mut points: Vec<InfluencePoint>) -> Self {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        points.dedup_by(|a, b| (a.x - b.x).abs() <= POSITION_TOLERANCE);
        Self { points }
    }

    pub fn points(&self) -> &[InfluencePoint] {
        &self.points
    }

    /// Ordinate at `x`; `side` picks the limit at a discontinuity.
    /// Returns `None` off the structure.
    pub fn value(&self, x: f64, side: Face) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if x < first.x - POSITION_TOLERANCE || x > last.x + POSITION_TOLERANCE {
            return None;
        }

        let idx = self.points.partition_point(|p| p.x < x - POSITION_TOLERANCE);
        if let Some(p) = self.points.get(idx) {
            if (p.x - x).abs() <= POSITION_TOLERANCE {
                return Some(p.face(side));
            }
        }

        let a = self.points.get(idx.checked_sub(1)?)?;
        let b = self.points.get(idx)?;
        Some(interpolate(a, b, x))
    }

    /// Area of the parts of the line whose sign favors `opt`, and the
    /// loaded regions
    pub fn favorable_area(&self, opt: Optimization) -> (f64, Vec<(f64, f64)>) {
        let mut area = 0.0;
        let mut regions: Vec<(f64, f64)> = Vec::new();

        for w in self.points.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            let (ya, yb) = (a.right, b.left);

            let piece = match (opt.favors(ya), opt.favors(yb)) {
                (true, true) => Some((a.x, b.x, (ya + yb) / 2.0 * (b.x - a.x))),
                (true, false) => {
                    let xc = a.x + (b.x - a.x) * ya / (ya - yb);
                    Some((a.x, xc, ya / 2.0 * (xc - a.x)))
                }
                (false, true) => {
                    let xc = a.x + (b.x - a.x) * ya / (ya - yb);
                    Some((xc, b.x, yb / 2.0 * (b.x - xc)))
                }
                (false, false) => None,
            };

            if let Some((start, end, piece_area)) = piece {
                area += piece_area;
                match regions.last_mut() {
                    Some(last) if (last.1 - start).abs() <= POSITION_TOLERANCE => last.1 = end,
                    _ => regions.push((start, end)),
                }
            }
        }

        (area, regions)
    }

    /// Area under the line over the given regions
    pub fn area_over(&self, regions: &[(f64, f64)]) -> f64 {
        regions
            .iter()
            .map(|&(from, to)| {
                self.points
                    .windows(2)
                    .map(|w| {
                        let lo = w[0].x.max(from);
                        let hi = w[1].x.min(to);
                        if hi <= lo {
                            return 0.0;
                        }
                        let y_lo = interpolate(&w[0], &w[1], lo);
                        let y_hi = interpolate(&w[0], &w[1], hi);
                        (y_lo + y_hi) / 2.0 * (hi - lo)
                    })
                    .sum::<f64>()
            })
            .sum()
    }
}

fn interpolate(a: &InfluencePoint, b: &InfluencePoint, x: f64) -> f64 {
    if b.x - a.x <= 0.0 {
        return a.right;
    }
    let t = (x - a.x) / (b.x - a.x);
    a.right + (b.left - a.right) * t
}

/// Scale on the truck and lane parts of a vehicle
pub(crate) fn part_factors(
    vehicle: &VehicularLoad,
    model: &LiveLoadModel,
    include_impact: bool,
) -> (f64, f64) {
    let (truck_im, lane_im) = if include_impact {
        (model.truck_impact, model.lane_impact)
    } else {
        (0.0, 0.0)
    };
    (
        vehicle.truck_factor * (1.0 + truck_im),
        vehicle.lane_factor * (1.0 + lane_im),
    )
}

struct TruckPlacement {
    value: f64,
    axles: Vec<AxlePlacement>,
    reversed: bool,
    spacings: Vec<f64>,
    side: Face,
}

/// Governing placement of one vehicle on an influence line
pub(crate) struct VehiclePlacement {
    pub value: f64,
    pub configuration: AxleConfiguration,
}

/// Place a vehicle to drive the response in the direction of `opt`.
///
/// Every axle is tried at every influence point in both travel directions
/// and for every trial spacing. Axles whose contribution works against the
/// extreme are picked up. The lane load covers the areas of favorable sign.
pub(crate) fn place_vehicle(
    il: &InfluenceLine,
    vehicle: &VehicularLoad,
    index: usize,
    model: &LiveLoadModel,
    opt: Optimization,
    include_impact: bool,
    spacing_steps: usize,
) -> VehiclePlacement {
    let (truck_scale, lane_scale) = part_factors(vehicle, model, include_impact);

    let truck = vehicle
        .uses_truck()
        .then(|| best_truck(il, vehicle, opt, spacing_steps));
    let lane = vehicle.uses_lane().then(|| il.favorable_area(opt));

    let truck_value = truck.as_ref().map_or(0.0, |t| t.value * truck_scale);
    let lane_value = lane
        .as_ref()
        .map_or(0.0, |(area, _)| area * vehicle.lane_load * lane_scale);

    let (use_truck, use_lane) = match vehicle.configuration {
        VehicularLoadConfiguration::TruckLaneEnvelope if truck.is_some() && lane.is_some() => {
            if opt.improves(lane_value, truck_value) {
                (false, true)
            } else {
                (true, false)
            }
        }
        _ => (truck.is_some(), lane.is_some()),
    };

    let mut value = 0.0;
    if use_truck {
        value += truck_value;
    }
    if use_lane {
        value += lane_value;
    }

    let (axles, reversed, spacings, side) = match truck {
        Some(t) => {
            let axles = if use_truck {
                t.axles
            } else {
                t.axles
                    .into_iter()
                    .map(|a| AxlePlacement { weight: 0.0, ..a })
                    .collect()
            };
            (axles, t.reversed, t.spacings, t.side)
        }
        None => (Vec::new(), false, Vec::new(), Face::Left),
    };

    let lane_regions = match lane {
        Some((_, regions)) if use_lane => regions,
        _ => Vec::new(),
    };

    VehiclePlacement {
        value,
        configuration: AxleConfiguration {
            vehicle: index,
            vehicle_name: vehicle.name.clone(),
            axles,
            reversed,
            spacings,
            side,
            truck_applied: use_truck,
            lane_regions,
            lane_load: vehicle.lane_load,
        },
    }
}

/// Response of an influence line to a fixed vehicle placement
pub(crate) fn evaluate_configuration(
    il: &InfluenceLine,
    vehicle: &VehicularLoad,
    model: &LiveLoadModel,
    configuration: &AxleConfiguration,
    include_impact: bool,
) -> f64 {
    let (truck_scale, lane_scale) = part_factors(vehicle, model, include_impact);

    let truck = if configuration.truck_applied {
        configuration
            .axles
            .iter()
            .filter(|a| a.weight != 0.0)
            .filter_map(|a| il.value(a.location, configuration.side).map(|y| a.weight * y))
            .sum::<f64>()
            * truck_scale
    } else {
        0.0
    };

    let lane = configuration.lane_load * lane_scale * il.area_over(&configuration.lane_regions);

    truck + lane
}

fn axle_offsets(spacings: &[f64]) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(spacings.len());
    let mut offset = 0.0;
    for spacing in spacings {
        offsets.push(offset);
        offset += spacing;
    }
    offsets
}

fn best_truck(
    il: &InfluenceLine,
    vehicle: &VehicularLoad,
    opt: Optimization,
    spacing_steps: usize,
) -> TruckPlacement {
    let mut best: Option<TruckPlacement> = None;

    for spacings in vehicle.spacing_trials(spacing_steps) {
        let offsets = axle_offsets(&spacings);
        for reversed in [false, true] {
            for point in il.points() {
                let sides: &[Face] = if point.is_continuous() {
                    &[Face::Left]
                } else {
                    &[Face::Left, Face::Right]
                };
                for &side in sides {
                    for offset in &offsets {
                        let front = if reversed {
                            point.x - offset
                        } else {
                            point.x + offset
                        };
                        let (value, axles) =
                            place_axles(il, vehicle, &offsets, front, reversed, side, opt);
                        if best.as_ref().map_or(true, |b| opt.improves(value, b.value)) {
                            best = Some(TruckPlacement {
                                value,
                                axles,
                                reversed,
                                spacings: spacings.clone(),
                                side,
                            });
                        }
                    }
                }
            }
        }
    }

    best.unwrap_or_else(|| TruckPlacement {
        value: 0.0,
        axles: vehicle
            .axles
            .iter()
            .map(|_| AxlePlacement {
                weight: 0.0,
                location: 0.0,
            })
            .collect(),
        reversed: false,
        spacings: vehicle.axles.iter().map(|a| a.spacing).collect(),
        side: Face::Left,
    })
}

fn place_axles(
    il: &InfluenceLine,
    vehicle: &VehicularLoad,
    offsets: &[f64],
    front: f64,
    reversed: bool,
    side: Face,
    opt: Optimization,
) -> (f64, Vec<AxlePlacement>) {
    let mut value = 0.0;
    let axles = vehicle
        .axles
        .iter()
        .zip(offsets)
        .map(|(axle, offset)| {
            let location = if reversed { front + offset } else { front - offset };
            let contribution = il
                .value(location, side)
                .map(|y| axle.weight * y)
                .filter(|c| opt.favors(*c));
            match contribution {
                Some(c) => {
                    value += c;
                    AxlePlacement {
                        weight: axle.weight,
                        location,
                    }
                }
                None => AxlePlacement {
                    weight: 0.0,
                    location,
                },
            }
        })
        .collect();
    (value, axles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::Axle;
    use approx::assert_relative_eq;

    /// Moment influence line at midspan of a 10 m simple span
    fn midspan_moment() -> InfluenceLine {
        InfluenceLine::new(vec![
            InfluencePoint::continuous(0.0, 0.0),
            InfluencePoint::continuous(5.0, 2.5),
            InfluencePoint::continuous(10.0, 0.0),
        ])
    }

    #[test]
    fn test_interpolation_and_jump() {
        let il = InfluenceLine::new(vec![
            InfluencePoint::continuous(0.0, 0.0),
            InfluencePoint {
                x: 4.0,
                left: -0.4,
                right: 0.6,
            },
            InfluencePoint::continuous(10.0, 0.0),
        ]);
        assert_relative_eq!(il.value(2.0, Face::Left).unwrap_or_default(), -0.2);
        assert_relative_eq!(il.value(4.0, Face::Left).unwrap_or_default(), -0.4);
        assert_relative_eq!(il.value(4.0, Face::Right).unwrap_or_default(), 0.6);
        assert_relative_eq!(il.value(7.0, Face::Left).unwrap_or_default(), 0.3);
        assert!(il.value(10.5, Face::Left).is_none());
    }

    #[test]
    fn test_favorable_area_splits_at_zero() {
        let il = InfluenceLine::new(vec![
            InfluencePoint::continuous(0.0, 1.0),
            InfluencePoint::continuous(2.0, -1.0),
        ]);
        let (pos, pos_regions) = il.favorable_area(Optimization::Maximize);
        let (neg, _) = il.favorable_area(Optimization::Minimize);
        assert_relative_eq!(pos, 0.5);
        assert_relative_eq!(neg, -0.5);
        assert_eq!(pos_regions.len(), 1);
        assert_relative_eq!(pos_regions[0].1, 1.0);
        assert_relative_eq!(il.area_over(&pos_regions), 0.5);
    }

    #[test]
    fn test_single_axle_at_peak() {
        let model = LiveLoadModel::new("LL");
        let truck = VehicularLoad::truck("P", vec![Axle::new(100.0, 0.0)]);
        let placement = place_vehicle(
            &midspan_moment(),
            &truck,
            0,
            &model,
            Optimization::Maximize,
            true,
            4,
        );
        assert_relative_eq!(placement.value, 250.0);
        assert_relative_eq!(placement.configuration.axles[0].location, 5.0);
    }

    #[test]
    fn test_axles_off_structure_are_dropped() {
        let model = LiveLoadModel::new("LL");
        let truck = VehicularLoad::truck(
            "Long",
            vec![Axle::new(50.0, 30.0), Axle::new(100.0, 0.0)],
        );
        let placement = place_vehicle(
            &midspan_moment(),
            &truck,
            0,
            &model,
            Optimization::Maximize,
            false,
            4,
        );
        assert_relative_eq!(placement.value, 250.0);
        assert!(placement.configuration.total_weight() <= truck.total_weight());
        assert_relative_eq!(placement.configuration.total_weight(), 100.0);
    }

    #[test]
    fn test_lane_with_impact_and_factors() {
        let model = LiveLoadModel::new("LL").with_impact(0.33, 0.0);
        let lane = VehicularLoad::lane("Lane", 2.0).with_factors(1.0, 0.5);
        let placement = place_vehicle(
            &midspan_moment(),
            &lane,
            0,
            &model,
            Optimization::Maximize,
            true,
            4,
        );
        // area 12.5 * 2.0 * 0.5
        assert_relative_eq!(placement.value, 12.5);
        let again = evaluate_configuration(
            &midspan_moment(),
            &lane,
            &model,
            &placement.configuration,
            true,
        );
        assert_relative_eq!(again, placement.value);
    }
}
