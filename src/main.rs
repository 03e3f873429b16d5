use indowater_api::{
    logger::start_log,
    modules::{
        api::{start_api, ApiContext},
        iot::{sweeper::start_sweeper, Hub},
        mqtt::start_mqtt,
    },
    shared::{
        config::Configs,
        db::{db_pool, get_db_access_manager, run_migrations, seed},
    },
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let configs = match Configs::load() {
        Ok(configs) => Arc::new(configs),
        Err(e) => {
            eprintln!("Failed to load configurations: {}", e);
            std::process::exit(1);
        }
    };
    start_log(&configs.logging.level);
    log::info!("Configurations loaded from {}", configs.config_path().display());

    let pool = match db_pool(&configs.database).and_then(|pool| run_migrations(&pool).map(|_| pool)) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to prepare the database: {}", e);
            std::process::exit(1);
        }
    };

    let seeded = get_db_access_manager(pool.clone()).and_then(|mut db| {
        seed::seed_rbac(&mut db)?;
        match &configs.seed {
            Some(seed_config) => seed::seed_admin(&mut db, seed_config),
            None => Ok(()),
        }
    });
    if let Err(e) = seeded {
        log::error!("Failed to seed the database: {}", e);
        std::process::exit(1);
    }

    let hub = Hub::new();
    let ctx = ApiContext {
        pool: pool.clone(),
        configs: Arc::clone(&configs),
        hub: hub.clone(),
    };

    let api = start_api(ctx);
    let sweeper = start_sweeper(pool.clone(), hub.clone(), configs.iot.clone());
    let mqtt = match configs.mqtt.clone() {
        Some(mqtt_config) => Some(start_mqtt(pool, hub, configs.iot.clone(), mqtt_config).await),
        None => {
            log::info!("No [mqtt] section, MQTT bridge disabled");
            None
        }
    };

    if let Err(e) = api.await {
        log::error!("API task stopped: {}", e);
    }
    sweeper.abort();
    if let Some(mqtt) = mqtt {
        mqtt.abort();
    }
}
