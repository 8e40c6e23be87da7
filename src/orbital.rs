//! Doppler correction for a polar-orbit satellite pass
//!
//! The satellite is modelled on a circular polar orbit above a spherical
//! Earth; the ground station is fixed on the surface. Positions are in an
//! Earth-centred, Earth-fixed frame, so the ground track drifts west at
//! the rotation rate while the satellite moves along its meridian.
//!
//! The result is the offset to apply to the carrier before it is handed
//! to the synthesiser (see [`FrequencyBand`]).

use core::f32::consts::TAU;
#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::drivers::FrequencyBand;

/// Speed of light (m/s)
pub const SPEED_OF_LIGHT: f32 = 3.0e8;

/// Newtonian gravitational constant (m^3 kg^-1 s^-2)
pub const GRAVITATIONAL_CONSTANT: f32 = 6.673_84e-11;

/// Mass of the Earth (kg)
pub const EARTH_MASS_KG: f32 = 5.972_19e24;

/// Mean equatorial radius (m)
pub const EARTH_RADIUS_M: f32 = 6_378e3;

/// Earth rotation rate (rad/s)
pub const EARTH_ROTATION_RAD_S: f32 = TAU / 86_400.0;

#[derive(Clone, Copy)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Vec3 {
    const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Unit vector pointing up through a surface point
    fn up(latitude_deg: f32, longitude_deg: f32) -> Self {
        let (lat, lon) = (latitude_deg.to_radians(), longitude_deg.to_radians());
        Self::new(lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
    }

    fn scale(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }
}

/// A point on the surface, in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    /// Latitude, north positive
    pub latitude_deg: f32,
    /// Longitude, east positive
    pub longitude_deg: f32,
}

impl GeoPoint {
    /// Create a point
    #[must_use]
    pub const fn new(latitude_deg: f32, longitude_deg: f32) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    fn up(self) -> Vec3 {
        Vec3::up(self.latitude_deg, self.longitude_deg)
    }

    fn north(self) -> Vec3 {
        let (lat, lon) = (self.latitude_deg.to_radians(), self.longitude_deg.to_radians());
        Vec3::new(-lon.cos() * lat.sin(), -lon.sin() * lat.sin(), lat.cos())
    }

    fn east(self) -> Vec3 {
        let lon = self.longitude_deg.to_radians();
        Vec3::new(-lon.sin(), lon.cos(), 0.0)
    }
}

/// Direction of travel along the orbit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Heading {
    /// Ascending pass
    #[default]
    Northward,
    /// Descending pass
    Southward,
}

/// One row of a pass table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassSample {
    /// Seconds from closest approach
    pub time_s: f32,
    /// Satellite sub-point; angles are not wrapped
    pub sub_point: GeoPoint,
    /// Elevation above the station's horizon (degrees)
    pub elevation_deg: f32,
    /// Azimuth clockwise from north, 0-360 (degrees)
    pub azimuth_deg: f32,
    /// Doppler shift of the carrier (Hz)
    pub doppler_hz: f32,
}

/// Carrier, orbit and ground station of a polar-orbit link
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarOrbit {
    /// Transmitted carrier (Hz)
    pub carrier_hz: f32,
    /// Orbital altitude above the surface (m)
    pub altitude_m: f32,
    /// Receiving ground station
    pub station: GeoPoint,
}

impl PolarOrbit {
    /// Describe a link
    #[must_use]
    pub const fn new(carrier_hz: f32, altitude_m: f32, station: GeoPoint) -> Self {
        Self {
            carrier_hz,
            altitude_m,
            station,
        }
    }

    /// Distance from the Earth's centre to the satellite (m)
    #[must_use]
    pub fn orbit_radius_m(&self) -> f32 {
        EARTH_RADIUS_M + self.altitude_m
    }

    /// Angular rate along the orbit (rad/s)
    #[must_use]
    pub fn angular_rate(&self) -> f32 {
        let r = self.orbit_radius_m();
        (GRAVITATIONAL_CONSTANT * EARTH_MASS_KG / (r * r * r)).sqrt()
    }

    fn latitude_rate(&self, heading: Heading) -> f32 {
        match heading {
            Heading::Northward => self.angular_rate(),
            Heading::Southward => -self.angular_rate(),
        }
    }

    /// Synthesiser band for the carrier, if one covers it
    #[must_use]
    pub fn band(&self) -> Option<FrequencyBand> {
        FrequencyBand::from_frequency_mhz(self.carrier_hz / 1e6)
    }

    /// Range rate towards the station (m/s); positive while approaching
    #[must_use]
    pub fn closing_speed(&self, satellite: GeoPoint, heading: Heading) -> f32 {
        let r = self.orbit_radius_m();
        let (lat, lon) = (
            satellite.latitude_deg.to_radians(),
            satellite.longitude_deg.to_radians(),
        );
        let dlat = self.latitude_rate(heading);
        let dlon = -EARTH_ROTATION_RAD_S;

        let velocity = Vec3::new(
            -lon.sin() * lat.cos() * dlon - lon.cos() * lat.sin() * dlat,
            lon.cos() * lat.cos() * dlon - lon.sin() * lat.sin() * dlat,
            lat.cos() * dlat,
        )
        .scale(r);

        let line_of_sight = self.line_of_sight(satellite);
        velocity.dot(line_of_sight) / line_of_sight.norm()
    }

    /// Doppler shift seen at the station (Hz)
    #[must_use]
    pub fn doppler_hz(&self, satellite: GeoPoint, heading: Heading) -> f32 {
        let v = self.closing_speed(satellite, heading);
        // c/(c-v)*f - f, without losing v/c to f32 rounding
        self.carrier_hz * v / (SPEED_OF_LIGHT - v)
    }

    /// Frequency to tune to so the received carrier lands on `carrier_hz`
    #[must_use]
    pub fn corrected_hz(&self, satellite: GeoPoint, heading: Heading) -> f32 {
        self.carrier_hz + self.doppler_hz(satellite, heading)
    }

    /// Elevation of the satellite above the station's horizon (degrees)
    #[must_use]
    pub fn elevation_deg(&self, satellite: GeoPoint) -> f32 {
        let (up, _, _) = self.local_components(satellite);
        up.clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Azimuth of the satellite, clockwise from north, 0-360 (degrees)
    #[must_use]
    pub fn azimuth_deg(&self, satellite: GeoPoint) -> f32 {
        let (_, north, east) = self.local_components(satellite);
        let azimuth = east.atan2(north).to_degrees();
        if azimuth < 0.0 {
            azimuth + 360.0
        } else {
            azimuth
        }
    }

    /// Sub-point `time_s` seconds from a pass that crosses the station
    /// at `time_s = 0`
    #[must_use]
    pub fn sub_point_at(&self, time_s: f32, heading: Heading) -> GeoPoint {
        let dlat = self.latitude_rate(heading);
        GeoPoint::new(
            self.station.latitude_deg + (dlat * time_s).to_degrees(),
            self.station.longitude_deg - (EARTH_ROTATION_RAD_S * time_s).to_degrees(),
        )
    }

    /// Everything a pass table needs at one instant
    #[must_use]
    pub fn sample(&self, time_s: f32, heading: Heading) -> PassSample {
        let sub_point = self.sub_point_at(time_s, heading);
        PassSample {
            time_s,
            sub_point,
            elevation_deg: self.elevation_deg(sub_point),
            azimuth_deg: self.azimuth_deg(sub_point),
            doppler_hz: self.doppler_hz(sub_point, heading),
        }
    }

    /// Vector from the satellite to the station (m)
    fn line_of_sight(&self, satellite: GeoPoint) -> Vec3 {
        let station = self.station.up().scale(EARTH_RADIUS_M);
        station.sub(satellite.up().scale(self.orbit_radius_m()))
    }

    /// Unit direction to the satellite as (up, north, east) components
    fn local_components(&self, satellite: GeoPoint) -> (f32, f32, f32) {
        let towards = self.line_of_sight(satellite);
        let towards = towards.scale(-1.0 / towards.norm());
        (
            towards.dot(self.station.up()),
            towards.dot(self.station.north()),
            towards.dot(self.station.east()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATION: GeoPoint = GeoPoint::new(49.261_731, -123.249_541);

    fn link() -> PolarOrbit {
        PolarOrbit::new(437.5e6, 800e3, STATION)
    }

    fn offset(dlat: f32, dlon: f32) -> GeoPoint {
        GeoPoint::new(STATION.latitude_deg + dlat, STATION.longitude_deg + dlon)
    }

    #[test]
    fn orbit_period_is_about_a_hundred_minutes() {
        let period_min = TAU / link().angular_rate() / 60.0;
        assert!((100.0..102.0).contains(&period_min));
    }

    #[test]
    fn overhead_pass_has_no_shift() {
        let orbit = link();
        assert!(orbit.doppler_hz(STATION, Heading::Northward).abs() < 1.0);
        assert!(orbit.elevation_deg(STATION) > 89.5);
    }

    #[test]
    fn approaching_is_positive_receding_is_negative() {
        let orbit = link();
        let south = offset(-10.0, 0.0);
        let north = offset(10.0, 0.0);

        let approaching = orbit.doppler_hz(south, Heading::Northward);
        assert!((8_000.0..8_900.0).contains(&approaching));
        assert!(orbit.doppler_hz(north, Heading::Northward) < -8_000.0);
        assert!(orbit.doppler_hz(south, Heading::Southward) < -8_000.0);
        assert!((approaching + orbit.doppler_hz(south, Heading::Southward)).abs() < 5.0);
    }

    #[test]
    fn shift_never_exceeds_orbital_speed() {
        let orbit = link();
        let limit = orbit.carrier_hz * orbit.angular_rate() * orbit.orbit_radius_m()
            / SPEED_OF_LIGHT
            * 1.01;
        for t in (-3_000..=3_000).step_by(150) {
            #[allow(clippy::cast_precision_loss)]
            let sample = orbit.sample(t as f32, Heading::Northward);
            assert!(sample.doppler_hz.abs() < limit);
        }
    }

    #[test]
    fn corrected_frequency_adds_the_shift() {
        let orbit = link();
        let sat = offset(-10.0, 0.0);
        let shift = orbit.doppler_hz(sat, Heading::Northward);
        assert!((orbit.corrected_hz(sat, Heading::Northward) - (437.5e6 + shift)).abs() < 64.0);
    }

    #[test]
    fn azimuth_follows_compass_points() {
        let orbit = link();
        let due_north = orbit.azimuth_deg(offset(10.0, 0.0));
        assert!(due_north < 1.0 || due_north > 359.0);
        assert!((orbit.azimuth_deg(offset(-10.0, 0.0)) - 180.0).abs() < 1.0);
        assert!((orbit.azimuth_deg(offset(0.0, 5.0)) - 88.1).abs() < 1.0);
        assert!((orbit.azimuth_deg(offset(0.0, -5.0)) - 271.9).abs() < 1.0);
    }

    #[test]
    fn far_side_of_the_earth_is_below_the_horizon() {
        let orbit = link();
        let antipode = GeoPoint::new(-STATION.latitude_deg, STATION.longitude_deg + 180.0);
        assert!(orbit.elevation_deg(antipode) < -89.0);
        assert!(orbit.elevation_deg(offset(-10.0, 0.0)) > 0.0);
    }

    #[test]
    fn pass_is_centred_on_the_station() {
        let orbit = link();
        let mid = orbit.sample(0.0, Heading::Northward);
        assert_eq!(mid.sub_point, STATION);

        let later = orbit.sub_point_at(60.0, Heading::Northward);
        assert!(later.latitude_deg > STATION.latitude_deg);
        assert!(later.longitude_deg < STATION.longitude_deg);
        let later = orbit.sub_point_at(60.0, Heading::Southward);
        assert!(later.latitude_deg < STATION.latitude_deg);
    }

    #[test]
    fn uhf_carrier_maps_to_its_band() {
        assert_eq!(link().band(), Some(FrequencyBand::Band410To480));
        let out_of_range = PolarOrbit::new(2.4e9, 800e3, STATION);
        assert_eq!(out_of_range.band(), None);
    }
}
