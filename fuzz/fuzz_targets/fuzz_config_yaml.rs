#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the pipeline configuration loader.
///
/// Arbitrary YAML is parsed and, when it deserializes, resolved. Resolution
/// must either succeed or report its problems as errors.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(config) = api_compat::PipelineConfig::from_yaml(s)
    {
        let _ = config.resolve();
    }
});
