//! Device list: the accessory view of every device in the aggregate.

use tabled::Tabled;

use cubesense_core::{AggregateRecord, DataSource, Repository, SensorCloud, SensorReadings};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, MISSING, reading};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Temp")]
    temperature: String,
    #[tabled(rename = "Humidity")]
    humidity: String,
    #[tabled(rename = "VOC")]
    voc: String,
    #[tabled(rename = "Air Quality")]
    air_quality: String,
    #[tabled(rename = "Battery")]
    battery: String,
}

impl From<&AggregateRecord> for DeviceRow {
    fn from(r: &AggregateRecord) -> Self {
        let sensor = SensorReadings::from(r);
        let air_quality = sensor
            .environment
            .as_ref()
            .map_or_else(|| MISSING.into(), |e| e.air_quality.to_string());
        let battery = match (&sensor.battery, r.battery_percentage()) {
            (Some(_), Some(pct)) => format!("{pct:.0}%"),
            (Some(b), None) => b.status.map_or_else(|| MISSING.into(), |s| s.to_string()),
            (None, _) => MISSING.into(),
        };

        Self {
            id: r.id.to_string(),
            name: r.display_name().to_owned(),
            dtype: r.device_type.clone().unwrap_or_else(|| MISSING.into()),
            temperature: reading(r.temperature(), 1, "°C"),
            humidity: reading(r.humidity(), 0, "%"),
            voc: reading(r.voc(), 0, " ppm"),
            air_quality,
            battery,
        }
    }
}

/// Records in id order, optionally restricted to cubes.
pub(crate) fn select(source: &DataSource, cubes_only: bool) -> Vec<&AggregateRecord> {
    source
        .records()
        .filter(|r| !cubes_only || r.is_cube())
        .collect()
}

pub(crate) fn render(records: &[&AggregateRecord], global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(
        &global.output,
        records,
        |r| DeviceRow::from(*r),
        |r| r.id.to_string(),
    )
}

pub async fn handle<C: SensorCloud>(
    repo: &Repository<C>,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let source = repo.load().await?;
    let records = select(&source, args.cubes);
    tracing::debug!(total = source.len(), shown = records.len(), "listing devices");

    let out = render(&records, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
