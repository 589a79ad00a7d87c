//! WGSL counterpart of [`crate::shading`]. Uniform structs mirror
//! [`crate::material::MaterialUniform`] and the renderer's object constants.

pub(crate) const SHADER: &str = r#"
struct GlobalUniform {
    projection: mat4x4<f32>,
}

struct Material {
    light: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    base_color: vec4<f32>,
    glow: vec4<f32>,
    mode: vec4<f32>,
}

struct ObjectConstants {
    model_view: mat4x4<f32>,
    normal: mat3x4<f32>,
    material: Material,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) view_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

const ATTENUATION_FALLOFF: f32 = 0.1;

fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if len > 0.0 {
        return v / len;
    }
    return vec3<f32>(0.0);
}

fn shade(position: vec3<f32>, surface_normal: vec3<f32>) -> vec3<f32> {
    let material = object.material;
    let normal = safe_normalize(surface_normal);
    let to_light = material.light.xyz - position;
    let light_dir = safe_normalize(to_light);
    let dist = length(to_light);
    let attenuation = material.light.w / (1.0 + ATTENUATION_FALLOFF * dist * dist);

    let ambient = material.diffuse.w * material.diffuse.rgb;

    let lambert = max(dot(normal, light_dir), 0.0);
    let diffuse = lambert * material.diffuse.rgb * attenuation;

    var specular = vec3<f32>(0.0);
    if lambert > 0.0 {
        let view_dir = safe_normalize(-position);
        let reflect_dir = reflect(-light_dir, normal);
        let highlight = pow(max(dot(view_dir, reflect_dir), 0.0), material.specular.w);
        specular = highlight * material.specular.rgb * attenuation;
    }

    return ambient + diffuse + specular;
}

fn glow_intensity(time: f32) -> f32 {
    let glow = object.material.glow;
    let base = sin(time * glow.x) * glow.y + glow.z;
    return pow(max(base, 0.0), glow.w);
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    var position = input.position;
    var normal = input.normal;

    let amplitude = object.material.mode.z;
    if amplitude != 0.0 {
        let phase = object.material.mode.y + position.x;
        position.y = position.y + sin(phase) * amplitude;
        let slope = cos(phase) * amplitude;
        normal = vec3<f32>(normal.x - slope * normal.y, normal.y, normal.z);
    }

    let view_position = object.model_view * vec4<f32>(position, 1.0);
    out.position = globals.projection * view_position;
    out.view_pos = view_position.xyz;

    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = safe_normalize(normal_matrix * normal);
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let mode = object.material.mode.x;
    if mode > 1.5 {
        return vec4<f32>(object.material.base_color.rgb, 1.0);
    }
    if mode > 0.5 {
        let intensity = glow_intensity(object.material.mode.y);
        return vec4<f32>(object.material.base_color.rgb * intensity, intensity);
    }
    return vec4<f32>(shade(input.view_pos, input.normal), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::SHADER;

    #[test]
    fn shader_declares_entry_points() {
        assert!(SHADER.contains("fn vs_main"));
        assert!(SHADER.contains("fn fs_main"));
    }
}
