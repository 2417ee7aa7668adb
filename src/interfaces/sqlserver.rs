use std::future::Future;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, Config as TdsConfig, EncryptionLevel, Row, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::config::DbCredentials;
use crate::constants::defaults;
use crate::data_mgmt::models::DbSelector;
use crate::helpers::time::as_of_cutoff;

use super::telemetry::{BatteryInfoRow, BurstRow, RawBatch, SourceError, TelemetrySource};

const APPLICATION_NAME: &str = "batt-report";

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server backed telemetry; connects per fetch and disconnects afterwards
pub struct SqlServerSource {
    credentials: DbCredentials,
    selector: DbSelector,
}

impl SqlServerSource {
    pub fn new(credentials: &DbCredentials, selector: DbSelector) -> Self {
        SqlServerSource {
            credentials: credentials.clone(),
            selector,
        }
    }

    fn tds_config(&self) -> TdsConfig {
        let mut config = TdsConfig::new();
        config.host(&self.credentials.server);
        config.port(self.credentials.port);
        config.database(&self.credentials.database);
        config.application_name(APPLICATION_NAME);
        config.authentication(AuthMethod::sql_server(
            &self.credentials.username,
            &self.credentials.password,
        ));
        config.encryption(EncryptionLevel::Required);
        config.trust_cert();
        config
    }

    async fn connect(&self) -> Result<TdsClient, SourceError> {
        let config = self.tds_config();
        log::debug!(
            "Connecting to {} at {}",
            self.credentials.database,
            config.get_addr()
        );
        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        Ok(Client::connect(config, tcp.compat_write()).await?)
    }

    async fn query_rows(
        &self,
        sql: &str,
        params: &[NaiveDateTime],
    ) -> Result<Vec<Row>, SourceError> {
        let mut client = self.connect().await?;
        let params: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let rows = client
            .query(sql, &params)
            .await?
            .into_first_result()
            .await?;
        client.close().await?;
        Ok(rows)
    }
}

impl TelemetrySource for SqlServerSource {
    fn selector(&self) -> DbSelector {
        self.selector
    }

    fn fetch(&mut self, as_of: Option<NaiveDate>) -> Result<RawBatch, SourceError> {
        match self.selector {
            DbSelector::Smbs => {
                let (sql, params) = battery_info_query(as_of);
                let rows = block_on(self.query_rows(&sql, &params))??;
                rows.iter()
                    .map(battery_info_row)
                    .collect::<Result<_, _>>()
                    .map(RawBatch::BatteryInfo)
            }
            DbSelector::DebugSmbs => {
                let (sql, params) = bursts_query(as_of);
                let rows = block_on(self.query_rows(&sql, &params))??;
                rows.iter()
                    .map(burst_row)
                    .collect::<Result<_, _>>()
                    .map(RawBatch::Bursts)
            }
        }
    }
}

/// Runs `fut` to completion on a runtime that lives only as long as this call
fn block_on<F: Future>(fut: F) -> Result<F::Output, SourceError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(fut))
}

/// Latest BatteryInfo row per asset; as of a date, only readings up to the start of that day count
fn battery_info_query(as_of: Option<NaiveDate>) -> (String, Vec<NaiveDateTime>) {
    let (date_filter, params) = match as_of {
        Some(date) => ("AND b.[EventTime] <= @P1", vec![date.and_time(NaiveTime::MIN)]),
        None => ("", vec![]),
    };
    let sql = format!(
        r#"
        WITH LatestReport AS (
            SELECT
                CAST(b.[ID] AS BIGINT) AS ID,
                CAST(b.[OrganizationId] AS BIGINT) AS OrganizationId,
                o.[Name] AS OrganizationName,
                CAST(b.[AssetId] AS BIGINT) AS AssetId,
                a.[DeviceName] AS DeviceID,
                a.[Name] AS AssetName,
                b.[EventTime] AS EventTime,
                CAST(b.[Voltage] AS FLOAT) AS Voltage,
                ROW_NUMBER() OVER (PARTITION BY b.[AssetId] ORDER BY b.[EventTime] DESC, b.[ID] DESC) AS rn
            FROM [dbo].[BatteryInfo] AS b
            LEFT JOIN [dbo].[Assets] AS a ON b.[AssetId] = a.[ID]
            LEFT JOIN [dbo].[Organizations] AS o ON b.[OrganizationId] = o.[ID]
            WHERE 1=1
            {date_filter}
        )
        SELECT ID, OrganizationId, OrganizationName, AssetId, DeviceID, AssetName, EventTime, Voltage
        FROM LatestReport
        WHERE rn = 1
        ORDER BY DeviceID;
        "#
    );
    (sql, params)
}

fn bursts_query(as_of: Option<NaiveDate>) -> (String, Vec<NaiveDateTime>) {
    let months = defaults::LOOKBACK_MONTHS;
    let (window, params) = match as_of {
        Some(date) => (
            format!(
                "AND [EventTimeUTC] <= @P1 AND [EventTimeUTC] >= DATEADD(MONTH, -{months}, @P2)"
            ),
            vec![as_of_cutoff(date), date.and_time(NaiveTime::MIN)],
        ),
        None => (
            format!("AND [EventTimeUTC] >= DATEADD(MONTH, -{months}, GETUTCDATE())"),
            vec![],
        ),
    };
    let sql = format!(
        r#"
        WITH LatestBursts AS (
            SELECT
                [DeviceID],
                [DeviceName],
                [CustomerName],
                [EventTimeUTC],
                [PayloadData],
                ROW_NUMBER() OVER (PARTITION BY [DeviceID] ORDER BY [EventTimeUTC] DESC) AS rn
            FROM [dbo].[Bursts]
            WHERE
                [CustomerName] = 'Zim'
                AND [FPort] = 1
                AND [DeviceID] LIKE 'A0%'
                AND [PayloadData] LIKE '%Battery Level%'
                AND [PayloadData] NOT LIKE '%Battery Level 0%'
                {window}
        )
        SELECT DeviceID, DeviceName, CustomerName, EventTimeUTC, PayloadData
        FROM LatestBursts
        WHERE rn = 1
        ORDER BY EventTimeUTC DESC;
        "#
    );
    (sql, params)
}

fn opt_string(row: &Row, col: &str) -> Result<Option<String>, SourceError> {
    Ok(row.try_get::<&str, _>(col)?.map(str::to_string))
}

fn battery_info_row(row: &Row) -> Result<BatteryInfoRow, SourceError> {
    Ok(BatteryInfoRow {
        id: row
            .try_get::<i64, _>("ID")?
            .ok_or_else(|| SourceError::Row("BatteryInfo row without ID".into()))?,
        organization_id: row.try_get::<i64, _>("OrganizationId")?,
        organization_name: opt_string(row, "OrganizationName")?,
        asset_id: row.try_get::<i64, _>("AssetId")?,
        device_id: opt_string(row, "DeviceID")?,
        asset_name: opt_string(row, "AssetName")?,
        event_time: row.try_get::<NaiveDateTime, _>("EventTime")?,
        voltage: row.try_get::<f64, _>("Voltage")?,
    })
}

fn burst_row(row: &Row) -> Result<BurstRow, SourceError> {
    Ok(BurstRow {
        device_id: opt_string(row, "DeviceID")?,
        device_name: opt_string(row, "DeviceName")?,
        customer_name: opt_string(row, "CustomerName")?,
        event_time: row.try_get::<NaiveDateTime, _>("EventTimeUTC")?,
        payload: opt_string(row, "PayloadData")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn battery_info_picks_newest_row_per_asset() {
        let (sql, params) = battery_info_query(None);
        assert!(sql.contains("ORDER BY b.[EventTime] DESC, b.[ID] DESC"));
        assert!(!sql.contains("@P1"));
        assert!(params.is_empty());
    }

    #[test]
    fn battery_info_as_of_binds_midnight() {
        let (sql, params) = battery_info_query(Some(date("2025-01-15")));
        assert!(sql.contains("b.[EventTime] <= @P1"));
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].to_string(), "2025-01-15 00:00:00");
    }

    #[test]
    fn bursts_window_is_four_months() {
        let (latest, params) = bursts_query(None);
        assert!(latest.contains("DATEADD(MONTH, -4, GETUTCDATE())"));
        assert!(params.is_empty());

        let (as_of, params) = bursts_query(Some(date("2025-01-15")));
        assert!(as_of.contains("[EventTimeUTC] <= @P1"));
        assert!(as_of.contains("DATEADD(MONTH, -4, @P2)"));
        assert_eq!(params[0].to_string(), "2025-01-15 12:00:00");
        assert_eq!(params[1].to_string(), "2025-01-15 00:00:00");
    }

    #[test]
    fn tds_config_targets_selected_database() {
        let creds = DbCredentials {
            server: "db.example.net".into(),
            port: 14330,
            database: "DebugSMBs".into(),
            username: "report".into(),
            password: "secret".into(),
        };
        let source = SqlServerSource::new(&creds, DbSelector::DebugSmbs);
        assert_eq!(source.tds_config().get_addr(), "db.example.net:14330");
        assert_eq!(source.selector(), DbSelector::DebugSmbs);
    }
}
