pub mod collection_log;
pub mod price;
pub mod signal;
pub mod stock;
pub mod task;
pub mod token;

pub use collection_log::{CollectionLog, NewCollectionLog, log_status};
pub use price::{NewPriceHistory, PriceHistory};
pub use signal::{NewSignal, Signal};
pub use stock::{NewStock, Stock, StockCollectionUpdate};
pub use task::{NewTask, Task, TaskProgressUpdate, status, task_type};
pub use token::{NewTokenCacheRow, TokenCacheRow};
