pub mod demo_source;
pub mod excel_exporter;
pub mod live_source;
pub mod measurement_source;
pub mod result_printer;

pub use demo_source::DemoSource;
pub use excel_exporter::ExcelExporter;
pub use live_source::LiveSource;
pub use measurement_source::MeasurementSource;
