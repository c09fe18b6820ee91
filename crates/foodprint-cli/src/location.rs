//! Consumer location flags shared by every subcommand.

use std::time::Duration;

use clap::Args;
use foodprint_core::{AppConfig, Coordinates, UserLocation};
use foodprint_geo::{acquire_user_location, HttpSettings, IpGeolocation, PositionSource};

#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct LocationArgs {
    /// Your latitude in decimal degrees
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Your longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// Your city
    #[arg(long)]
    pub city: Option<String>,
    /// Your country
    #[arg(long)]
    pub country: Option<String>,
    /// Look up your position from your IP address; the manual flags become the fallback
    #[arg(long)]
    pub locate: bool,
}

impl LocationArgs {
    /// The location typed on the command line, which may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `--lat`/`--lng` are out of range.
    pub fn manual(&self) -> anyhow::Result<UserLocation> {
        let mut location = UserLocation::from_place(self.city.clone(), self.country.clone());
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            let coords = Coordinates::new(lat, lng)?;
            location.latitude = Some(coords.lat);
            location.longitude = Some(coords.lng);
        }
        Ok(location)
    }

    /// Ask for a live position when `--locate` is set, otherwise use the
    /// manual flags.
    ///
    /// # Errors
    ///
    /// Returns an error when no usable location results, or the IP lookup
    /// client cannot be built.
    pub async fn acquire(&self, config: &AppConfig) -> anyhow::Result<UserLocation> {
        let manual = self.manual()?;
        let timeout = Duration::from_secs(config.geolocation_timeout_secs);

        let located = if self.locate {
            let ip = IpGeolocation::new(&config.ip_location_base_url, &HttpSettings::from(config))?;
            let source: &dyn PositionSource = &ip;
            acquire_user_location(Some(source), timeout, Some(manual)).await
        } else {
            acquire_user_location(None, timeout, Some(manual)).await
        };

        Ok(located?)
    }
}
