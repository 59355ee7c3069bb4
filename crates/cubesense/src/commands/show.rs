//! Single-device detail: identity plus every accessory service.

use owo_colors::OwoColorize;

use cubesense_core::{AirQuality, BatteryStatus, CarbonDioxideStatus, Repository, SensorCloud, SensorReadings};

use crate::cli::{GlobalOpts, ShowArgs};
use crate::error::CliError;
use crate::output::{self, MISSING, reading};

fn paint_quality(q: AirQuality, color: bool) -> String {
    if !color {
        return q.to_string();
    }
    match q {
        AirQuality::Excellent | AirQuality::Good => q.green().to_string(),
        AirQuality::Fair => q.yellow().to_string(),
        AirQuality::Inferior | AirQuality::Poor => q.red().to_string(),
        AirQuality::Unknown => q.dimmed().to_string(),
    }
}

fn detail(s: &SensorReadings, color: bool) -> String {
    let mut lines = vec![
        format!("ID:            {}", s.id),
        format!("Name:          {}", s.name),
        format!("Manufacturer:  {}", s.manufacturer),
        format!("Model:         {}", s.model.as_deref().unwrap_or(MISSING)),
        format!("Serial:        {}", s.serial),
    ];

    if let Some(ref env) = s.environment {
        let co2 = match env.carbon_dioxide {
            Some(CarbonDioxideStatus::Abnormal) if color => "abnormal".red().to_string(),
            Some(status) => status.to_string().to_lowercase(),
            None => MISSING.into(),
        };
        lines.extend([
            format!("Temperature:   {}", reading(env.temperature, 1, " °C")),
            format!("Humidity:      {}", reading(env.humidity, 0, " %")),
            format!("CO2 level:     {}", reading(env.carbon_dioxide_level, 0, " ppm")),
            format!("CO2 detected:  {co2}"),
            format!("Air quality:   {}", paint_quality(env.air_quality, color)),
            format!("Pressure:      {}", reading(env.pressure, 0, " mbar")),
            format!("Noise:         {}", reading(env.noise_dba, 0, " dBA")),
        ]);
    }

    if let Some(ref battery) = s.battery {
        let status = match battery.status {
            Some(BatteryStatus::Low) if color => "low".red().to_string(),
            Some(status) => status.to_string().to_lowercase(),
            None => MISSING.into(),
        };
        lines.push(format!("Battery:       {}", reading(battery.percentage, 0, " %")));
        lines.push(format!("Battery state: {status}"));
    }

    let services: Vec<String> = s.services().into_iter().map(|k| s.service_name(k)).collect();
    lines.push(format!(
        "Services:      {}",
        if services.is_empty() {
            MISSING.into()
        } else {
            services.join(", ")
        }
    ));

    lines.join("\n")
}

pub async fn handle<C: SensorCloud>(
    repo: &Repository<C>,
    args: &ShowArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let record = repo.device(&args.id).await?;
    let sensor = SensorReadings::from(&record);
    let color = output::should_color(&global.color);

    let out = output::render_single(&global.output, &sensor, |s| detail(s, color), |s| s.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
