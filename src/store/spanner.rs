use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::conn::Environment;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::client::{Client, ClientConfig, Error as SpannerError};
use gcloud_spanner::key::{Key, all_keys};
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::statement::Statement;
use gcloud_spanner::transaction_rw::ReadWriteTransaction;
use gcloud_spanner::value::CommitTimestamp;
use std::num::ParseIntError;
use std::sync::Arc;

use super::{COUNTER_KEY, KvStore};
use crate::config::SpannerSettings;

const TABLE: &str = "kv_store";
const COLUMNS: [&str; 3] = ["id", "data", "updated_at"];

/// Store Adapter backed by a single Cloud Spanner table
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to the configured database, provisioning the instance,
    /// database and table first if they are missing.
    ///
    /// An emulator host in the settings routes both the admin and the data
    /// client to that emulator; otherwise production Spanner is used.
    pub async fn connect(settings: &SpannerSettings) -> Result<Self> {
        auto_provision(settings).await?;

        let database_path = settings.database_path();

        let client_config = match &settings.emulator_host {
            Some(host) => {
                tracing::info!("Connecting to Spanner emulator at: {}", host);
                ClientConfig {
                    environment: Environment::Emulator(host.clone()),
                    ..Default::default()
                }
            }
            None => {
                tracing::info!("Connecting to production Spanner");
                ClientConfig::default()
            }
        };

        let client = Client::new(&database_path, client_config)
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!("Successfully connected to Spanner database: {}", database_path);

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn upsert(&self, key: String, data: String) -> Result<()> {
        let mutation = insert_or_update(TABLE, &COLUMNS, &[&key, &data, &CommitTimestamp::new()]);

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to write record to Spanner")?;

        tracing::debug!("Wrote record with key: {}", key);
        Ok(())
    }

    async fn read(&self, key: String) -> Result<Option<String>> {
        let mut statement = Statement::new("SELECT data FROM kv_store WHERE id = @id");
        statement.add_param("id", &key);

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query record from Spanner")?;

        match result_set.next().await? {
            Some(row) => {
                let data: String = row.column_by_name("data")?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl KvStore for SpannerStore {
    async fn ping(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create ping transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute ping query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Spanner ping succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Ping query returned no results"))
        }
    }

    async fn next_id(&self) -> Result<u64> {
        // Read and write happen in one read-write transaction, so Spanner
        // serializes concurrent increments and retries aborted ones.
        let (_, next) = self
            .inner
            .read_write_transaction(|tx| Box::pin(advance_counter(tx)))
            .await
            .context("Failed to advance id counter")?;

        let next = next.context("Counter key holds a non-numeric value")?;
        tracing::debug!("Counter advanced to {}", next);
        Ok(next)
    }

    async fn get(&self, id: u64) -> Result<Option<String>> {
        self.read(id.to_string()).await
    }

    async fn set(&self, id: u64, record: String) -> Result<()> {
        self.upsert(id.to_string(), record).await
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let key = id.to_string();
        self.inner
            .apply(vec![delete(TABLE, Key::new(&key))])
            .await
            .context("Failed to delete record from Spanner")?;

        tracing::debug!("Deleted record with key: {}", key);
        Ok(())
    }

    async fn exists(&self, id: u64) -> Result<bool> {
        Ok(self.read(id.to_string()).await?.is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let statement = Statement::new("SELECT id FROM kv_store");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction for keys")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to list keys from Spanner")?;

        let mut keys = Vec::new();
        while let Some(row) = result_set.next().await? {
            keys.push(row.column_by_name::<String>("id")?);
        }

        tracing::debug!("Listed {} keys", keys.len());
        Ok(keys)
    }

    async fn flush_all(&self) -> Result<()> {
        self.inner
            .apply(vec![delete(TABLE, all_keys())])
            .await
            .context("Failed to flush Spanner table")?;

        tracing::info!("Flushed all records from {}", TABLE);
        Ok(())
    }
}

/// Read the counter row and buffer its increment inside `tx`.
///
/// A corrupt counter is reported through the inner result so nothing is written.
async fn advance_counter(
    tx: &mut ReadWriteTransaction,
) -> Result<Result<u64, ParseIntError>, SpannerError> {
    let counter_key = COUNTER_KEY.to_string();
    let mut statement = Statement::new("SELECT data FROM kv_store WHERE id = @id");
    statement.add_param("id", &counter_key);

    let mut rows = tx.query(statement).await?;
    let current: String = match rows.next().await? {
        Some(row) => row.column_by_name("data")?,
        None => "0".to_string(),
    };
    let next = match current.parse::<u64>() {
        Ok(value) => value + 1,
        Err(e) => return Ok(Err(e)),
    };
    drop(rows);

    let next_text = next.to_string();
    tx.buffer_write(vec![insert_or_update(
        TABLE,
        &COLUMNS,
        &[&counter_key, &next_text, &CommitTimestamp::new()],
    )]);
    Ok(Ok(next))
}

/// Make sure the instance, database and `kv_store` table exist
async fn auto_provision(settings: &SpannerSettings) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_config = match &settings.emulator_host {
        Some(host) => AdminClientConfig {
            environment: Environment::Emulator(host.clone()),
            ..Default::default()
        },
        None => AdminClientConfig::default(),
    };

    let admin_client = AdminClient::new(admin_config)
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", settings.project);
    let instance_path = format!("{}/instances/{}", project_path, settings.instance);
    let database_path = settings.database_path();

    ensure_instance_exists(&admin_client, settings, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, settings, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    settings: &SpannerSettings,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if settings.emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: settings.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", settings.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    settings: &SpannerSettings,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client
        .database()
        .get_database(get_request, None)
        .await
    {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", settings.database),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response.into_inner().statements.iter().any(|stmt| {
        stmt.contains("CREATE TABLE kv_store") || stmt.contains("CREATE TABLE `kv_store`")
    });

    if table_exists {
        tracing::info!("Table '{}' already exists", TABLE);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", TABLE);

    // Values are JSON text, except the counter row which holds a decimal number
    let create_table_ddl = r#"
CREATE TABLE kv_store (
    id STRING(64) NOT NULL,
    data STRING(MAX) NOT NULL,
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (id)
"#
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", TABLE);
    Ok(())
}
