pub mod power_indicator;
