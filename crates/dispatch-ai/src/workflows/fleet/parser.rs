use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::FleetImportError;
use crate::workflows::recommendation::{
    ComplaintRecord, DriverId, DriverProfile, DriverStatus, LiveTelemetry, OrderRecord,
    OrderStatus, PriorityLevel, VehicleType,
};

/// Deserialize every row of `reader`, keeping the source line for error reporting.
pub(crate) fn read_rows<T, R>(
    file: &'static str,
    reader: R,
) -> Result<Vec<(u64, T)>, FleetImportError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| FleetImportError::Csv { file, source })?
        .clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|source| FleetImportError::Csv { file, source })?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row = record
            .deserialize(Some(&headers))
            .map_err(|source| FleetImportError::Csv { file, source })?;
        rows.push((line, row));
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DriverRow {
    id: u64,
    full_name: String,
    status: DriverStatus,
    vehicle_type: VehicleType,
    rating: Option<f64>,
    priority_level: PriorityLevel,
    priority_score: Option<u32>,
}

impl DriverRow {
    pub(crate) fn into_profile(self) -> Result<DriverProfile, String> {
        if let Some(rating) = self.rating {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(format!("rating {rating} outside 0-5"));
            }
        }
        let raw_score = self.priority_score.unwrap_or(0);
        let priority_score = u8::try_from(raw_score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| format!("priority_score {raw_score} above 100"))?;

        Ok(DriverProfile {
            id: DriverId(self.id),
            full_name: self.full_name,
            status: self.status,
            vehicle_type: self.vehicle_type,
            rating: self.rating,
            priority_level: self.priority_level,
            priority_score,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderRow {
    id: u64,
    driver_id: Option<u64>,
    status: OrderStatus,
    distance_km: f64,
    fare: f64,
    rating: Option<u8>,
}

impl OrderRow {
    pub(crate) fn into_record(self) -> Result<OrderRecord, String> {
        non_negative("distance_km", self.distance_km)?;
        non_negative("fare", self.fare)?;
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(format!("order rating {rating} outside 1-5"));
            }
        }

        Ok(OrderRecord {
            id: self.id,
            driver_id: self.driver_id.map(DriverId),
            status: self.status,
            distance_km: self.distance_km,
            fare: self.fare,
            rating: self.rating,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComplaintRow {
    id: u64,
    order_id: u64,
    driver_id: Option<u64>,
}

impl ComplaintRow {
    pub(crate) fn into_record(self) -> ComplaintRecord {
        ComplaintRecord {
            id: self.id,
            order_id: self.order_id,
            driver_id: self.driver_id.map(DriverId),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelemetryRow {
    driver_id: u64,
    distance_from_pickup_km: f64,
    current_workload: Option<u32>,
}

impl TelemetryRow {
    pub(crate) fn into_reading(self) -> Result<(DriverId, LiveTelemetry), String> {
        non_negative("distance_from_pickup_km", self.distance_from_pickup_km)?;

        Ok((
            DriverId(self.driver_id),
            LiveTelemetry {
                distance_from_pickup_km: self.distance_from_pickup_km,
                current_workload: self.current_workload.unwrap_or(0),
            },
        ))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be a non-negative number, got {value}"))
    }
}
