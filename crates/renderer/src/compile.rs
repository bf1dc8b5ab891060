use std::borrow::Cow;

use effects::ShaderSpec;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{label}: WGSL parse error:\n{message}")]
    Parse { label: &'static str, message: String },
    #[error("{label}: WGSL validation error:\n{message}")]
    Validation { label: &'static str, message: String },
    #[error("{label}: missing {stage} entry point '{name}'")]
    MissingEntryPoint {
        label: &'static str,
        stage: &'static str,
        name: &'static str,
    },
    #[error("{label}: pipeline creation failed: {message}")]
    Pipeline { label: &'static str, message: String },
}

/// Parses and validates an effect's WGSL with naga and checks that the entry
/// points the pipeline will reference exist with the right stage.
pub fn validate(spec: &ShaderSpec) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(spec.source).map_err(|err| ShaderError::Parse {
        label: spec.label,
        message: err.emit_to_string(spec.source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|err| ShaderError::Validation {
            label: spec.label,
            message: err.emit_to_string(spec.source),
        })?;

    for (stage, name, naga_stage) in [
        ("vertex", spec.vertex_entry, naga::ShaderStage::Vertex),
        ("fragment", spec.fragment_entry, naga::ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|entry| entry.name == name && entry.stage == naga_stage);
        if !found {
            return Err(ShaderError::MissingEntryPoint {
                label: spec.label,
                stage,
                name,
            });
        }
    }

    Ok(module)
}

/// Validates the WGSL and hands it to the device.
pub(crate) fn compile_shader(
    device: &wgpu::Device,
    spec: &ShaderSpec,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate(spec)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(spec.label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(spec.source)),
    }))
}
