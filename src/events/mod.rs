/*
 * Almagest
 * Copyright (C) 2024-onward the Almagest contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Astronomical event search: a generic bracketed refinement of any
//! observer-dependent scalar of time, and the composed searches built
//! on it (risings and settings, satellite passes, conjunctions and
//! oppositions, distance extrema, lunar phases).
//!
//! Every search drives the passed coordinates forward in time and
//! recomputes the participating objects' ephemerides at each sample; on
//! return the coordinates and ephemerides are restored to the caller's
//! time.

use crate::constants::{
    KM_PER_EARTH_RADII, MINUTES_PER_DAY, SECONDS_PER_DAY, SIDEREAL_PER_SOLAR_DAYS,
};
use crate::catalog::object::Object;
use crate::coords::{Coordinates, Frame};
use crate::math::angles::{Angle, TWO_PI};
use crate::math::spherical::Spherical;
use crate::time::Time;

use log::debug;

/// One-second refinement floor, in days.
const SECOND: f64 = 1.0 / SECONDS_PER_DAY;

/// A located event: its time and the value of the event function there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventTime {
    pub time: Time,
    pub value: f64,
}

/// Circumstances at one point of a pass: time, azimuth, and altitude
/// (radians, azimuth from north through east).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassPoint {
    pub time: Time,
    pub azm: f64,
    pub alt: f64,
}

impl Default for PassPoint {
    fn default() -> Self {
        Self {
            time: Time::new(f64::INFINITY, 0.0),
            azm: f64::INFINITY,
            alt: f64::INFINITY,
        }
    }
}

/// A complete overhead pass, or a day's rise/transit/set circumstances.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pass {
    pub rising: PassPoint,
    pub transit: PassPoint,
    pub setting: PassPoint,
}

/// Which circumstance of the diurnal motion to solve for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RiseSetEvent {
    Rise,
    Transit,
    Set,
}

impl RiseSetEvent {
    fn sign(&self) -> f64 {
        match self {
            RiseSetEvent::Rise => -1.0,
            RiseSetEvent::Transit => 0.0,
            RiseSetEvent::Set => 1.0,
        }
    }
}

/// The scalar an event search tracks, evaluated after the participating
/// objects' ephemerides are brought to the sample time.
pub type EventFn = dyn Fn(&Coordinates, Option<&Object>, Option<&Object>) -> f64;

/// Physical distance between two objects' apparent positions, in AU.
pub fn object_distance(_coords: &Coordinates, a: Option<&Object>, b: Option<&Object>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => {
            (a.direction * a.distance - b.direction * b.distance).norm()
        }
        _ => f64::INFINITY,
    }
}

/// Angular separation between two objects' apparent directions, radians.
pub fn object_separation(_coords: &Coordinates, a: Option<&Object>, b: Option<&Object>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => crate::math::angular_separation(&a.direction, &b.direction),
        _ => f64::INFINITY,
    }
}

/// Apparent altitude of the first object above the horizon, radians.
pub fn object_altitude(coords: &Coordinates, a: Option<&Object>, _b: Option<&Object>) -> f64 {
    match a {
        Some(a) => {
            Spherical::from_vector(&coords.transform(
                Frame::Fundamental,
                Frame::Horizon,
                a.direction,
            ))
            .lat
        }
        None => f64::INFINITY,
    }
}

/// The hour angle at which an object with declination `dec`, seen from
/// latitude `lat`, stands at altitude `alt`. Returns zero when the
/// object never reaches the altitude and pi when it never descends to
/// it. All angles in radians.
pub fn semi_diurnal_arc(lat: f64, dec: f64, alt: f64) -> f64 {
    let cos_ha = (alt.sin() - dec.sin() * lat.sin()) / (dec.cos() * lat.cos());
    if cos_ha >= 1.0 {
        0.0
    } else if cos_ha <= -1.0 {
        std::f64::consts::PI
    } else {
        cos_ha.acos()
    }
}

/// Closed-form time of rising, transit, or setting closest to `time`
/// for fixed equatorial coordinates (ra, dec) at the given epoch, seen
/// from (lon, lat), crossing altitude `alt`. Returns +infinity for an
/// object that never sets below the altitude and -infinity for one that
/// never rises above it. The coordinates must be referred to the same
/// precessional epoch as the time.
pub fn rise_transit_set_time(
    time: Time,
    ra: f64,
    dec: f64,
    event: RiseSetEvent,
    lon: f64,
    lat: f64,
    alt: f64,
) -> Time {
    let ha = semi_diurnal_arc(lat, dec, alt);

    if ha == std::f64::consts::PI && event != RiseSetEvent::Transit {
        return Time::new(f64::INFINITY, time.zone);
    }
    if ha == 0.0 {
        return Time::new(f64::NEG_INFINITY, time.zone);
    }

    let lst = time.sidereal_time(lon).rad();
    // Angle the Earth still has to turn through for the event, reduced
    // to the nearest half turn either way.
    let theta = Angle::new(ra - lst + event.sign() * ha).mod_pi().rad();
    time + theta / TWO_PI / SIDEREAL_PER_SOLAR_DAYS
}

/// As `rise_transit_set_time`, reading the object's current apparent
/// direction out of the coordinates.
pub fn rise_transit_set(
    time: Time,
    coords: &Coordinates,
    object: &Object,
    event: RiseSetEvent,
    alt: f64,
) -> Time {
    let loc = coords.location();
    let equ = Spherical::from_vector(&coords.transform(
        Frame::Fundamental,
        Frame::Equatorial,
        object.direction,
    ));
    rise_transit_set_time(time, equ.lon, equ.lat, event, loc.lon, loc.lat, alt)
}

/// Iteratively solves for the event time nearest `time`, recomputing
/// the object's ephemeris at each estimate until it converges to one
/// second or ten iterations pass. On return the coordinates and object
/// are left at the event time. Does not suit objects that rise and set
/// several times a day.
pub fn rise_transit_set_search(
    mut time: Time,
    coords: &mut Coordinates,
    object: &mut Object,
    event: RiseSetEvent,
    alt: f64,
) -> Time {
    for _ in 0..10 {
        coords.set_time(time);
        object.compute_ephemeris(coords);
        let next = rise_transit_set(time, coords, object, event, alt);
        let delta = (next.jd - time.jd).abs();
        time = next;
        if !time.jd.is_finite() || delta <= SECOND {
            break;
        }
    }
    time
}

/// Solves for the event on the local day containing `today`. Returns
/// -infinity / +infinity when the object does not rise or set that day.
pub fn rise_transit_set_search_day(
    today: Time,
    coords: &mut Coordinates,
    object: &mut Object,
    event: RiseSetEvent,
    alt: f64,
) -> Time {
    let start = today.local_midnight();
    let end = start + 1.0;

    let mut time = rise_transit_set_search(start + 0.5, coords, object, event, alt);

    // A result outside the day means the nearest event belongs to a
    // neighboring day; search again from that day's middle.
    if time.jd > end.jd {
        time = rise_transit_set_search(start - 0.5, coords, object, event, alt);
    } else if time.jd < start.jd {
        time = rise_transit_set_search(end + 0.5, coords, object, event, alt);
    }

    if time.jd > end.jd || time.jd < start.jd {
        let jd = if event == RiseSetEvent::Rise {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Time::new(jd, today.zone);
    }
    time
}

/// Computes an object's rise, transit, and set circumstances for the
/// local day containing `today`, rising and setting at altitude `alt`.
/// The coordinates and object are restored on return.
pub fn daily_pass(today: Time, coords: &mut Coordinates, object: &mut Object, alt: f64) -> Pass {
    let saved = coords.time();
    let mut pass = Pass::default();

    for (event, point, threshold) in [
        (RiseSetEvent::Rise, &mut pass.rising, alt),
        (RiseSetEvent::Transit, &mut pass.transit, 0.0),
        (RiseSetEvent::Set, &mut pass.setting, alt),
    ] {
        let time = rise_transit_set_search_day(today, coords, object, event, threshold);
        point.time = time;
        if time.jd.is_finite() {
            let hor = Spherical::from_vector(&coords.transform(
                Frame::Fundamental,
                Frame::Horizon,
                object.direction,
            ));
            point.azm = hor.lon;
            point.alt = hor.lat;
        }
    }

    coords.set_time(saved);
    object.compute_ephemeris(coords);
    pass
}

/// Scans for overhead passes of an Earth satellite between `start` and
/// `stop`: a pass opens when the apparent altitude crosses above
/// `min_alt`, tracks its peak, and closes on the way back down. Uses a
/// coarse one-minute step while the satellite is more than a degree
/// below the horizon and a one-second step otherwise. The coordinates
/// and object are restored on return.
pub fn find_satellite_passes(
    coords: &mut Coordinates,
    satellite: &mut Object,
    start: Time,
    stop: Time,
    min_alt: f64,
    max_passes: usize,
) -> Vec<Pass> {
    let saved = coords.time();
    let mut passes = Vec::new();
    let mut pass = Pass::default();
    let mut max_alt = 0.0;
    let mut old_alt = f64::INFINITY;

    let mut time = start;
    while time.jd <= stop.jd && passes.len() < max_passes {
        coords.set_time(time);
        satellite.compute_ephemeris(coords);
        let hor = Spherical::from_vector(&coords.transform(
            Frame::Fundamental,
            Frame::Horizon,
            satellite.direction,
        ));
        let (azm, alt) = (hor.lon, hor.lat);

        if old_alt.is_finite() {
            // Crossing above the threshold opens a pass.
            if alt > min_alt && old_alt < min_alt {
                pass.rising = PassPoint { time, azm, alt };
                max_alt = 0.0;
            }
            if alt > min_alt && alt > max_alt {
                pass.transit = PassPoint { time, azm, alt };
                max_alt = alt;
            }
            // Crossing back below closes it.
            if old_alt > min_alt && alt < min_alt && pass.rising.time.jd.is_finite() {
                pass.setting = PassPoint { time, azm, alt };
                passes.push(pass);
                pass = Pass::default();
                max_alt = 0.0;
            }
        }
        old_alt = alt;

        // Fine stepping near and above the horizon.
        let step = if alt > -1.0_f64.to_radians() {
            SECOND
        } else {
            1.0 / MINUTES_PER_DAY
        };
        time = time + step;
    }

    coords.set_time(saved);
    satellite.compute_ephemeris(coords);
    debug!("found {} satellite passes", passes.len());
    passes
}

/// The composed form of the pass search: the next rising is found with
/// the generic equality finder, the following setting likewise, and the
/// peak with the extremum finder between them.
pub fn find_satellite_passes_composed(
    coords: &mut Coordinates,
    satellite: &mut Object,
    start: Time,
    stop: Time,
    min_alt: f64,
    max_passes: usize,
) -> Vec<Pass> {
    let saved = coords.time();
    let mut passes = Vec::new();
    let mut search_from = start;

    while passes.len() < max_passes {
        let mut risings = Vec::new();
        find_events_inner(
            coords,
            &mut Some(&mut *satellite),
            &mut None,
            search_from.jd,
            stop.jd,
            1.0 / MINUTES_PER_DAY,
            Crossing::FromBelow,
            min_alt,
            &object_altitude,
            &mut risings,
            1,
            search_from.zone,
        );
        let rising = match risings.first() {
            Some(event) => *event,
            None => break,
        };
        let rising_hor = horizon_of(coords, satellite);

        let mut settings = Vec::new();
        find_events_inner(
            coords,
            &mut Some(&mut *satellite),
            &mut None,
            rising.time.jd,
            rising.time.jd + 1.0,
            1.0 / MINUTES_PER_DAY,
            Crossing::FromAbove,
            min_alt,
            &object_altitude,
            &mut settings,
            1,
            search_from.zone,
        );
        let setting = match settings.first() {
            Some(event) => *event,
            None => break,
        };
        let setting_hor = horizon_of(coords, satellite);

        let mut peaks = Vec::new();
        find_events_inner(
            coords,
            &mut Some(&mut *satellite),
            &mut None,
            rising.time.jd,
            setting.time.jd,
            (setting.time.jd - rising.time.jd) / 10.0,
            Crossing::Maximum,
            min_alt,
            &object_altitude,
            &mut peaks,
            1,
            search_from.zone,
        );
        let peak = match peaks.first() {
            Some(event) => *event,
            None => break,
        };
        let peak_hor = horizon_of(coords, satellite);

        passes.push(Pass {
            rising: PassPoint {
                time: rising.time,
                azm: rising_hor.lon,
                alt: rising_hor.lat,
            },
            transit: PassPoint {
                time: peak.time,
                azm: peak_hor.lon,
                alt: peak_hor.lat,
            },
            setting: PassPoint {
                time: setting.time,
                azm: setting_hor.lon,
                alt: setting_hor.lat,
            },
        });
        search_from = setting.time;
    }

    coords.set_time(saved);
    satellite.compute_ephemeris(coords);
    passes
}

fn horizon_of(coords: &Coordinates, object: &Object) -> Spherical {
    Spherical::from_vector(&coords.transform(
        Frame::Fundamental,
        Frame::Horizon,
        object.direction,
    ))
}

/// Julian Date of the next time the Moon-minus-Sun ecliptic longitude
/// difference reaches `phase` (0 new, pi/2 first quarter, pi full,
/// 3 pi/2 last quarter) after `time`. Converges to under a minute in at
/// most ten iterations. The Sun and Moon ephemerides are recomputed and
/// left at the returned time.
pub fn next_moon_phase(
    time: Time,
    sun: &mut Object,
    moon: &mut Object,
    phase: f64,
) -> Time {
    // Phases are defined geocentrically.
    let mut coords = Coordinates::new(time, Spherical::new(0.0, 0.0, -KM_PER_EARTH_RADII));
    let mut time = time;

    for i in 0..10 {
        coords.set_time(time);
        sun.compute_ephemeris(&coords);
        let sun_lon =
            Spherical::from_vector(&coords.transform(Frame::Fundamental, Frame::Ecliptic, sun.direction))
                .lon;
        moon.compute_ephemeris(&coords);
        let moon_lon = Spherical::from_vector(&coords.transform(
            Frame::Fundamental,
            Frame::Ecliptic,
            moon.direction,
        ))
        .lon;

        let mut dellon = Angle::new(moon_lon - sun_lon - phase).mod_pi().rad();
        // Force the first correction to land ahead of the start time.
        if i == 0 && dellon > 0.0 {
            dellon -= TWO_PI;
        }

        // The Moon gains a full turn on the Sun each synodic month.
        let deltime = dellon / (TWO_PI / 29.5);
        time = time - deltime;
        if deltime.abs() <= 1.0 / MINUTES_PER_DAY {
            break;
        }
    }
    time
}

/// Direction or shape of the feature the generic finder looks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Crossing {
    Minimum,
    Maximum,
    FromBelow,
    FromAbove,
}

/// Locates local minima (`min` true) or maxima of the event function
/// between `start` and `stop`, sampling every `step` days. A bracketed
/// extremum is refined by rescanning the bracketing interval with a
/// tenfold smaller step until the step is below one second. Only
/// extrema passing the `limit` threshold are kept (at or below it for
/// minima, at or above for maxima). At most `max_events` events are
/// appended. The coordinates and objects are restored on return.
#[allow(clippy::too_many_arguments)]
pub fn find_events<F>(
    coords: &mut Coordinates,
    mut obj1: Option<&mut Object>,
    mut obj2: Option<&mut Object>,
    start: Time,
    stop: Time,
    step: f64,
    min: bool,
    limit: f64,
    func: F,
    events: &mut Vec<EventTime>,
    max_events: usize,
) where
    F: Fn(&Coordinates, Option<&Object>, Option<&Object>) -> f64,
{
    let saved = coords.time();
    find_events_inner(
        coords,
        &mut obj1,
        &mut obj2,
        start.jd,
        stop.jd,
        step,
        if min { Crossing::Minimum } else { Crossing::Maximum },
        limit,
        &func,
        events,
        max_events,
        start.zone,
    );
    restore(coords, saved, &mut obj1, &mut obj2);
}

/// Locates threshold crossings of the event function: with `below`
/// true, times where the value reaches `target` from below; otherwise
/// from above. Refinement matches `find_events`. The coordinates and
/// objects are restored on return.
#[allow(clippy::too_many_arguments)]
pub fn find_equality_events<F>(
    coords: &mut Coordinates,
    mut obj1: Option<&mut Object>,
    mut obj2: Option<&mut Object>,
    start: Time,
    stop: Time,
    step: f64,
    below: bool,
    target: f64,
    func: F,
    events: &mut Vec<EventTime>,
    max_events: usize,
) where
    F: Fn(&Coordinates, Option<&Object>, Option<&Object>) -> f64,
{
    let saved = coords.time();
    find_events_inner(
        coords,
        &mut obj1,
        &mut obj2,
        start.jd,
        stop.jd,
        step,
        if below { Crossing::FromBelow } else { Crossing::FromAbove },
        target,
        &func,
        events,
        max_events,
        start.zone,
    );
    restore(coords, saved, &mut obj1, &mut obj2);
}

fn restore(
    coords: &mut Coordinates,
    saved: Time,
    obj1: &mut Option<&mut Object>,
    obj2: &mut Option<&mut Object>,
) {
    coords.set_time(saved);
    if let Some(object) = obj1.as_deref_mut() {
        object.compute_ephemeris(coords);
    }
    if let Some(object) = obj2.as_deref_mut() {
        object.compute_ephemeris(coords);
    }
}

#[allow(clippy::too_many_arguments)]
fn find_events_inner(
    coords: &mut Coordinates,
    obj1: &mut Option<&mut Object>,
    obj2: &mut Option<&mut Object>,
    start: f64,
    stop: f64,
    step: f64,
    crossing: Crossing,
    limit: f64,
    func: &dyn Fn(&Coordinates, Option<&Object>, Option<&Object>) -> f64,
    events: &mut Vec<EventTime>,
    max_events: usize,
    zone: f64,
) {
    let mut old_val = f64::INFINITY;
    let mut cur_val = f64::INFINITY;

    let mut time = start;
    while time <= stop && events.len() < max_events {
        coords.set_time(Time::new(time, zone));
        if let Some(object) = obj1.as_deref_mut() {
            object.compute_ephemeris(coords);
        }
        if let Some(object) = obj2.as_deref_mut() {
            object.compute_ephemeris(coords);
        }

        let new_val = func(coords, obj1.as_deref(), obj2.as_deref());

        match crossing {
            Crossing::Minimum | Crossing::Maximum => {
                // Slide a three-sample window looking for a bracketed
                // extremum of the middle sample.
                let bracketed = old_val.is_finite()
                    && cur_val.is_finite()
                    && new_val.is_finite()
                    && match crossing {
                        Crossing::Minimum => {
                            new_val > cur_val && cur_val < old_val && cur_val <= limit
                        }
                        _ => new_val < cur_val && cur_val > old_val && cur_val >= limit,
                    };
                if bracketed {
                    if step < SECOND {
                        events.push(EventTime {
                            time: Time::new(time - step, zone),
                            value: cur_val,
                        });
                        return;
                    }
                    find_events_inner(
                        coords,
                        obj1,
                        obj2,
                        time - step * 2.0,
                        time,
                        step / 10.0,
                        crossing,
                        limit,
                        func,
                        events,
                        max_events,
                        zone,
                    );
                    // The window state is stale after the recursion's
                    // time travel; rebuild it as scanning proceeds.
                    old_val = f64::INFINITY;
                    cur_val = f64::INFINITY;
                    time += step;
                    continue;
                }
            }
            Crossing::FromBelow | Crossing::FromAbove => {
                let crossed = cur_val.is_finite()
                    && new_val.is_finite()
                    && match crossing {
                        Crossing::FromBelow => new_val >= limit && cur_val < limit,
                        _ => new_val <= limit && cur_val > limit,
                    };
                if crossed {
                    if step < SECOND {
                        events.push(EventTime {
                            time: Time::new(time, zone),
                            value: new_val,
                        });
                        return;
                    }
                    find_events_inner(
                        coords,
                        obj1,
                        obj2,
                        time - step,
                        time,
                        step / 10.0,
                        crossing,
                        limit,
                        func,
                        events,
                        max_events,
                        zone,
                    );
                    old_val = f64::INFINITY;
                    cur_val = f64::INFINITY;
                    time += step;
                    continue;
                }
            }
        }

        if cur_val.is_finite() {
            old_val = cur_val;
        }
        cur_val = new_val;
        time += step;
    }
}

/// Conjunctions: local minima of the apparent angular separation.
pub fn find_conjunctions(
    coords: &mut Coordinates,
    obj1: &mut Object,
    obj2: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    find_events(
        coords,
        Some(obj1),
        Some(obj2),
        start,
        stop,
        1.0,
        true,
        f64::INFINITY,
        object_separation,
        events,
        max_events,
    );
}

/// Oppositions: local maxima of the apparent angular separation.
pub fn find_oppositions(
    coords: &mut Coordinates,
    obj1: &mut Object,
    obj2: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    find_events(
        coords,
        Some(obj1),
        Some(obj2),
        start,
        stop,
        1.0,
        false,
        0.0,
        object_separation,
        events,
        max_events,
    );
}

/// Closest approaches: local minima of the physical distance.
pub fn find_nearest_distances(
    coords: &mut Coordinates,
    obj1: &mut Object,
    obj2: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    find_events(
        coords,
        Some(obj1),
        Some(obj2),
        start,
        stop,
        1.0,
        true,
        f64::INFINITY,
        object_distance,
        events,
        max_events,
    );
}

/// Mean apparent angular radius of the Sun plus the Moon, radians; a
/// solar eclipse somewhere on Earth requires the geocentric separation
/// to drop below roughly this.
const SOLAR_ECLIPSE_LIMIT: f64 = 0.0093 + 0.0162;

/// Angular radius of the Earth's umbra at the Moon plus the Moon's
/// radius, radians.
const LUNAR_ECLIPSE_LIMIT: f64 = 0.0135 + 0.0045;

/// Solar eclipses: minima of the geocentric Sun-Moon separation deep
/// enough that the lunar disc can reach the solar disc somewhere on
/// Earth. Eclipses are geocentric phenomena, so the search runs with a
/// geocenter observer regardless of where the caller's coordinates sit;
/// the threshold folds in the lunar parallax, flagging every partial
/// eclipse and the occasional near miss.
pub fn find_solar_eclipses(
    sun: &mut Object,
    moon: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    let mut coords =
        Coordinates::new(start, Spherical::new(0.0, 0.0, -KM_PER_EARTH_RADII));
    // Every syzygy is a separation minimum; refine them all, then keep
    // the ones whose refined minimum reaches eclipse depth. Filtering at
    // the coarse step would compare day-scale samples, degrees away from
    // the true minimum, against the threshold.
    let mut minima = Vec::new();
    find_events(
        &mut coords,
        Some(sun),
        Some(moon),
        start,
        stop,
        1.0,
        true,
        f64::INFINITY,
        object_separation,
        &mut minima,
        usize::MAX,
    );
    events.extend(
        minima
            .into_iter()
            .filter(|e| e.value <= SOLAR_ECLIPSE_LIMIT)
            .take(max_events.saturating_sub(events.len())),
    );
}

/// Lunar eclipses: minima of the Moon's geocentric separation from the
/// anti-solar direction small enough for the Moon to touch the umbra.
pub fn find_lunar_eclipses(
    sun: &mut Object,
    moon: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    let antisolar_separation =
        |_coords: &Coordinates, a: Option<&Object>, b: Option<&Object>| match (a, b) {
            (Some(sun), Some(moon)) => {
                crate::math::angular_separation(&(-sun.direction), &moon.direction)
            }
            _ => f64::INFINITY,
        };
    let mut coords =
        Coordinates::new(start, Spherical::new(0.0, 0.0, -KM_PER_EARTH_RADII));
    let mut minima = Vec::new();
    find_events(
        &mut coords,
        Some(sun),
        Some(moon),
        start,
        stop,
        1.0,
        true,
        f64::INFINITY,
        antisolar_separation,
        &mut minima,
        usize::MAX,
    );
    events.extend(
        minima
            .into_iter()
            .filter(|e| e.value <= LUNAR_ECLIPSE_LIMIT)
            .take(max_events.saturating_sub(events.len())),
    );
}

/// Greatest separations: local maxima of the physical distance.
pub fn find_farthest_distances(
    coords: &mut Coordinates,
    obj1: &mut Object,
    obj2: &mut Object,
    start: Time,
    stop: Time,
    events: &mut Vec<EventTime>,
    max_events: usize,
) {
    find_events(
        coords,
        Some(obj1),
        Some(obj2),
        start,
        stop,
        1.0,
        false,
        0.0,
        object_distance,
        events,
        max_events,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    // From latitude 0, an equatorial object spends half the day up.
    #[case(0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2)]
    fn semi_diurnal_arc_equator(
        #[case] lat: f64,
        #[case] dec: f64,
        #[case] alt: f64,
        #[case] expected: f64,
    ) {
        assert_abs_diff_eq!(semi_diurnal_arc(lat, dec, alt), expected, epsilon = 1e-12);
    }

    #[test]
    fn circumpolar_and_never_rising() {
        let lat = 0.8; // ~46 N
        // High northern declination never sets.
        assert_abs_diff_eq!(
            semi_diurnal_arc(lat, 1.4, 0.0),
            std::f64::consts::PI,
            epsilon = 1e-12
        );
        // Deep southern declination never rises.
        assert_abs_diff_eq!(semi_diurnal_arc(lat, -1.4, 0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn circumpolar_rise_time_is_infinite() {
        let time = Time::new(2_458_954.5, 0.0);
        let t = rise_transit_set_time(time, 1.0, 1.4, RiseSetEvent::Rise, 0.0, 0.8, 0.0);
        assert!(t.jd.is_infinite() && t.jd > 0.0);
        let t = rise_transit_set_time(time, 1.0, -1.4, RiseSetEvent::Rise, 0.0, 0.8, 0.0);
        assert!(t.jd.is_infinite() && t.jd < 0.0);
    }

    #[test]
    fn rise_set_bracket_transit() {
        let time = Time::new(2_458_954.5, 0.0);
        let (lon, lat) = (0.3, 0.7);
        let (ra, dec) = (2.0, 0.1);
        let rise = rise_transit_set_time(time, ra, dec, RiseSetEvent::Rise, lon, lat, 0.0);
        let transit = rise_transit_set_time(time, ra, dec, RiseSetEvent::Transit, lon, lat, 0.0);
        let set = rise_transit_set_time(time, ra, dec, RiseSetEvent::Set, lon, lat, 0.0);
        // All within half a day of the start, rise before transit when
        // folded onto the same diurnal cycle.
        for t in [rise, transit, set] {
            assert!((t.jd - time.jd).abs() <= 0.55);
        }
        let fold = |t: Time| (t.jd - transit.jd).rem_euclid(1.0 / SIDEREAL_PER_SOLAR_DAYS);
        assert!(fold(rise) > 0.5 / SIDEREAL_PER_SOLAR_DAYS);
        assert!(fold(set) < 0.5 / SIDEREAL_PER_SOLAR_DAYS);
    }

    /// A synthetic event function independent of any object: a cosine
    /// of time with a one-day period peaking at JD fraction zero.
    fn cosine_of_time(coords: &Coordinates, _a: Option<&Object>, _b: Option<&Object>) -> f64 {
        (TWO_PI * (coords.time().jd - 2_458_954.0)).cos()
    }

    fn test_coords() -> Coordinates {
        Coordinates::new(
            Time::new(2_458_954.0, 0.0),
            Spherical::new(0.0, 0.5, 0.0),
        )
    }

    #[test]
    fn finds_maxima_of_synthetic_function() {
        let mut coords = test_coords();
        let mut events = Vec::new();
        find_events(
            &mut coords,
            None,
            None,
            Time::new(2_458_954.2, 0.0),
            Time::new(2_458_957.3, 0.0),
            0.1,
            false,
            0.5,
            cosine_of_time,
            &mut events,
            10,
        );
        // Maxima at JD 2458955, 2458956, 2458957.
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            let expected = 2_458_955.0 + i as f64;
            assert_abs_diff_eq!(event.time.jd, expected, epsilon = 2.0 * SECOND);
            assert!(event.value > 0.999_999);
        }
        // Restoration: the caller's time is back.
        assert_abs_diff_eq!(coords.time().jd, 2_458_954.0, epsilon = 1e-12);
    }

    #[test]
    fn finds_minima_with_threshold() {
        let mut coords = test_coords();
        let mut events = Vec::new();
        // Threshold excludes every minimum (cos min = -1 > -2 passes, so
        // use limit below -1 to reject).
        find_events(
            &mut coords,
            None,
            None,
            Time::new(2_458_954.2, 0.0),
            Time::new(2_458_956.3, 0.0),
            0.1,
            true,
            -2.0,
            cosine_of_time,
            &mut events,
            10,
        );
        assert!(events.is_empty());

        find_events(
            &mut coords,
            None,
            None,
            Time::new(2_458_954.2, 0.0),
            Time::new(2_458_956.3, 0.0),
            0.1,
            true,
            0.0,
            cosine_of_time,
            &mut events,
            10,
        );
        assert_eq!(events.len(), 2);
        assert_abs_diff_eq!(events[0].time.jd, 2_458_954.5, epsilon = 2.0 * SECOND);
    }

    #[test]
    fn equality_events_find_crossings() {
        let mut coords = test_coords();
        let mut events = Vec::new();
        find_equality_events(
            &mut coords,
            None,
            None,
            Time::new(2_458_954.3, 0.0),
            Time::new(2_458_955.4, 0.0),
            0.05,
            true,
            0.0,
            cosine_of_time,
            &mut events,
            10,
        );
        // cos crosses zero from below at JD fraction 0.75.
        assert_eq!(events.len(), 1);
        assert_abs_diff_eq!(events[0].time.jd, 2_458_954.75, epsilon = 2.0 * SECOND);

        let mut falling = Vec::new();
        find_equality_events(
            &mut coords,
            None,
            None,
            Time::new(2_458_954.1, 0.0),
            Time::new(2_458_954.6, 0.0),
            0.05,
            false,
            0.0,
            cosine_of_time,
            &mut falling,
            10,
        );
        assert_eq!(falling.len(), 1);
        assert_abs_diff_eq!(falling[0].time.jd, 2_458_954.25, epsilon = 2.0 * SECOND);
    }

    #[test]
    fn events_are_ordered_and_bounded() {
        let mut coords = test_coords();
        let mut events = Vec::new();
        let start = Time::new(2_458_954.2, 0.0);
        let stop = Time::new(2_458_959.9, 0.0);
        find_events(
            &mut coords,
            None,
            None,
            start,
            stop,
            0.13,
            false,
            -10.0,
            cosine_of_time,
            &mut events,
            100,
        );
        assert!(!events.is_empty());
        for pair in events.windows(2) {
            assert!(pair[0].time.jd < pair[1].time.jd);
        }
        for event in &events {
            assert!(event.time.jd >= start.jd && event.time.jd <= stop.jd);
        }
    }
}
