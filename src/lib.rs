//! IP geolocation through a remote geo directory service.
//!
//! ```no_run
//! # use std::collections::HashMap;
//! # use std::sync::Arc;
//! use ipgeo::directory::HttpConnector;
//! use ipgeo::geo::{ConnectionManager, LookupAdapter};
//!
//! # async fn example(properties: HashMap<String, String>) -> Result<(), ipgeo::geo::LookupError> {
//! let adapter = LookupAdapter::new(ConnectionManager::new(Arc::new(HttpConnector)));
//! adapter.configuration_changed(&properties).await;
//!
//! let result = adapter.lookup("68.184.77.220").await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod functions;
pub mod geo;
pub mod settings;
