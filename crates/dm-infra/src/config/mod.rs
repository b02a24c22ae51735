mod materializer_settings;

pub use materializer_settings::MaterializerSettings;
