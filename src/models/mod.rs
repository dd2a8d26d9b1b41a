pub mod candle;
pub mod instrument;
pub mod signal;
pub mod timeframe;

pub use candle::{Candle, CandleSeries};
pub use instrument::{Instrument, Ticker};
pub use signal::{Signal, SignalState};
pub use timeframe::Timeframe;
