//! CSV fleet export loader producing an in-memory [`FleetStore`].

mod parser;
mod store;

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::workflows::recommendation::DriverId;
use parser::{read_rows, ComplaintRow, DriverRow, OrderRow, TelemetryRow};

pub use store::FleetStore;

pub const DRIVERS_FILE: &str = "drivers.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const COMPLAINTS_FILE: &str = "complaints.csv";
pub const TELEMETRY_FILE: &str = "telemetry.csv";

#[derive(Debug)]
pub enum FleetImportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    InvalidRow {
        file: &'static str,
        line: u64,
        reason: String,
    },
    DuplicateDriver {
        line: u64,
        driver_id: DriverId,
    },
}

impl std::fmt::Display for FleetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FleetImportError::Io { path, source } => {
                write!(f, "failed to read fleet export {}: {}", path.display(), source)
            }
            FleetImportError::Csv { file, source } => {
                write!(f, "invalid CSV data in {}: {}", file, source)
            }
            FleetImportError::InvalidRow { file, line, reason } => {
                write!(f, "{}:{}: {}", file, line, reason)
            }
            FleetImportError::DuplicateDriver { line, driver_id } => write!(
                f,
                "{}:{}: driver {} listed more than once",
                DRIVERS_FILE, line, driver_id
            ),
        }
    }
}

impl std::error::Error for FleetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FleetImportError::Io { source, .. } => Some(source),
            FleetImportError::Csv { source, .. } => Some(source),
            FleetImportError::InvalidRow { .. } | FleetImportError::DuplicateDriver { .. } => None,
        }
    }
}

pub struct FleetImporter;

impl FleetImporter {
    /// Load `drivers.csv`, `orders.csv`, `complaints.csv` and, when present, `telemetry.csv`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<FleetStore, FleetImportError> {
        let dir = dir.as_ref();
        let drivers = open(dir.join(DRIVERS_FILE))?;
        let orders = open(dir.join(ORDERS_FILE))?;
        let complaints = open(dir.join(COMPLAINTS_FILE))?;

        let telemetry_path = dir.join(TELEMETRY_FILE);
        let telemetry = if telemetry_path.is_file() {
            Some(open(telemetry_path)?)
        } else {
            None
        };

        let store = Self::from_readers(drivers, orders, complaints, telemetry)?;
        info!(
            dir = %dir.display(),
            drivers = store.driver_count(),
            active = store.active_driver_count(),
            orders = store.order_count(),
            complaints = store.complaint_count(),
            "fleet export loaded"
        );
        Ok(store)
    }

    pub fn from_readers<D, O, C, T>(
        drivers: D,
        orders: O,
        complaints: C,
        telemetry: Option<T>,
    ) -> Result<FleetStore, FleetImportError>
    where
        D: Read,
        O: Read,
        C: Read,
        T: Read,
    {
        let mut store = FleetStore::new();

        for (line, row) in read_rows::<DriverRow, _>(DRIVERS_FILE, drivers)? {
            let profile = row.into_profile().map_err(|reason| FleetImportError::InvalidRow {
                file: DRIVERS_FILE,
                line,
                reason,
            })?;
            let driver_id = profile.id;
            if store.insert_driver(profile).is_some() {
                return Err(FleetImportError::DuplicateDriver { line, driver_id });
            }
        }

        for (line, row) in read_rows::<OrderRow, _>(ORDERS_FILE, orders)? {
            let order = row.into_record().map_err(|reason| FleetImportError::InvalidRow {
                file: ORDERS_FILE,
                line,
                reason,
            })?;
            store.insert_order(order);
        }

        for (_, row) in read_rows::<ComplaintRow, _>(COMPLAINTS_FILE, complaints)? {
            store.insert_complaint(row.into_record());
        }

        if let Some(telemetry) = telemetry {
            let mut seen = HashSet::new();
            for (line, row) in read_rows::<TelemetryRow, _>(TELEMETRY_FILE, telemetry)? {
                let invalid = |reason| FleetImportError::InvalidRow {
                    file: TELEMETRY_FILE,
                    line,
                    reason,
                };
                let (driver_id, reading) = row.into_reading().map_err(invalid)?;
                if !seen.insert(driver_id) {
                    return Err(invalid(format!(
                        "duplicate telemetry reading for driver {driver_id}"
                    )));
                }
                store.set_telemetry(driver_id, reading);
            }
        }

        Ok(store)
    }
}

fn open(path: PathBuf) -> Result<File, FleetImportError> {
    File::open(&path).map_err(|source| FleetImportError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::recommendation::{
        DriverDirectory, LiveTelemetryProvider, OrderLedger, RepositoryError,
    };

    const DRIVERS: &str = "\
id,full_name,status,vehicle_type,rating,priority_level,priority_score
1,Budi Santoso,active,motor,4.8,priority,85
2,Sari Wulandari,suspended,car,,normal,10
3,Agus Pratama,active,pickup,3.9,normal,
";

    const ORDERS: &str = "\
id,driver_id,status,distance_km,fare,rating
100,1,completed,4.2,25000,5
101,1,cancelled,2.0,0,
102,,pending,3.0,18000,
103,3,completed,7.5,40000,4
";

    const COMPLAINTS: &str = "\
id,order_id,driver_id
9,103,3
10,102,
";

    const TELEMETRY: &str = "\
driver_id,distance_from_pickup_km,current_workload
1,1.5,0
";

    #[tokio::test]
    async fn loads_rows_into_store() {
        let store = FleetImporter::from_readers(
            DRIVERS.as_bytes(),
            ORDERS.as_bytes(),
            COMPLAINTS.as_bytes(),
            Some(TELEMETRY.as_bytes()),
        )
        .expect("fleet parses");

        assert_eq!(store.driver_count(), 3);
        assert_eq!(store.active_driver_count(), 2);
        assert_eq!(store.order_count(), 4);
        assert_eq!(store.complaint_count(), 1);

        let active = store.active_drivers().await.expect("directory");
        let ids: Vec<u64> = active.iter().map(|driver| driver.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(active[1].rating, Some(3.9));
        assert_eq!(active[1].priority_score, 0);

        let orders = store.orders_for_driver(DriverId(1)).await.expect("ledger");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].rating, Some(5));
        assert_eq!(orders[1].rating, None);

        let reading = store.telemetry(DriverId(1)).await.expect("telemetry");
        assert_eq!(reading.distance_from_pickup_km, 1.5);
        assert!(matches!(
            store.telemetry(DriverId(3)).await,
            Err(RepositoryError::Unavailable(_))
        ));
    }

    #[test]
    fn rejects_duplicate_drivers() {
        let drivers = format!("{DRIVERS}1,Budi Again,active,car,4.0,normal,20\n");
        let err = FleetImporter::from_readers(
            drivers.as_bytes(),
            ORDERS.as_bytes(),
            COMPLAINTS.as_bytes(),
            None::<&[u8]>,
        )
        .expect_err("duplicate rejected");

        assert!(matches!(
            err,
            FleetImportError::DuplicateDriver {
                driver_id: DriverId(1),
                line: 5
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_values_with_row_context() {
        let drivers = DRIVERS.replace("4.8,priority,85", "4.8,priority,120");
        let err = FleetImporter::from_readers(
            drivers.as_bytes(),
            ORDERS.as_bytes(),
            COMPLAINTS.as_bytes(),
            None::<&[u8]>,
        )
        .expect_err("priority score rejected");
        assert!(err.to_string().starts_with("drivers.csv:2:"), "{err}");

        let orders = ORDERS.replace("25000,5", "25000,7");
        let err = FleetImporter::from_readers(
            DRIVERS.as_bytes(),
            orders.as_bytes(),
            COMPLAINTS.as_bytes(),
            None::<&[u8]>,
        )
        .expect_err("order rating rejected");
        assert!(matches!(
            err,
            FleetImportError::InvalidRow {
                file: ORDERS_FILE,
                line: 2,
                ..
            }
        ));

        let telemetry = TELEMETRY.replace("1.5", "-2");
        let err = FleetImporter::from_readers(
            DRIVERS.as_bytes(),
            ORDERS.as_bytes(),
            COMPLAINTS.as_bytes(),
            Some(telemetry.as_bytes()),
        )
        .expect_err("negative distance rejected");
        assert!(err.to_string().contains("distance_from_pickup_km"));
    }

    #[test]
    fn unknown_enum_values_surface_as_csv_errors() {
        let drivers = DRIVERS.replace("suspended", "retired");
        let err = FleetImporter::from_readers(
            drivers.as_bytes(),
            ORDERS.as_bytes(),
            COMPLAINTS.as_bytes(),
            None::<&[u8]>,
        )
        .expect_err("unknown status rejected");
        assert!(matches!(
            err,
            FleetImportError::Csv {
                file: DRIVERS_FILE,
                ..
            }
        ));
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = std::env::temp_dir().join("dispatch-ai-missing-fleet-export");
        let err = FleetImporter::from_dir(&dir).expect_err("missing export");
        assert!(matches!(err, FleetImportError::Io { .. }));
        assert!(err.to_string().contains(DRIVERS_FILE));
    }
}
