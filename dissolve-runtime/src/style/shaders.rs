//! 各风格的片段着色器源码（Cogl snippet 约定）。
//!
//! 公共 uniform：
//! - `u_time`: 着色器时间 (0.0 - 1.0)
//! - `u_gate`: 溶解外观的混入量，0 = 原图，1 = 完全溶解
//! - `u_aspect`: 宽高比，用于修正圆形距离

/// 墨迹：分形噪声驱动的墨边扩散
pub const INK: &str = r#"
uniform sampler2D tex;
uniform float u_time;
uniform float u_intensity;
uniform float u_scale;
uniform float u_gate;
uniform vec2  u_center;
uniform float u_aspect;
uniform float u_edgeSoft;

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453123);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

void main() {
    vec2 uv = cogl_tex_coord_in[0].st;
    vec4 col = texture2D(tex, uv);
    vec2 cuv = uv - u_center;
    cuv.y /= u_aspect;
    float r = length(cuv);

    float n = 0.6 * noise(uv * u_scale + u_time * 0.8)
            + 0.3 * noise(uv * u_scale * 2.3 - u_time * 1.1)
            + 0.1 * noise(uv * u_scale * 4.7 + u_time * 1.7);

    float grow = mix(0.0, 1.2, u_time);
    float rim = smoothstep(grow - u_edgeSoft, grow, r + n * 0.15);

    vec3 dissolved = mix(col.rgb, vec3(0.0), rim * u_intensity);
    float dissolvedA = mix(col.a, 0.0, rim);

    float g = clamp(u_gate, 0.0, 1.0);
    cogl_color_out = vec4(mix(col.rgb, dissolved, g), mix(col.a, dissolvedA, g));
}
"#;

/// 像素化：块大小从 40 收敛到 2
pub const PIXELATE: &str = r#"
uniform sampler2D tex;
uniform float u_time;
uniform float u_gate;
uniform float u_aspect;

void main() {
    vec2 uv = cogl_tex_coord_in[0].st;
    float k = mix(40.0, 2.0, clamp(u_time, 0.0, 1.0));
    float g = clamp(u_gate, 0.0, 1.0);
    vec2 p = floor(uv * k) / k;
    cogl_color_out = texture2D(tex, mix(uv, p, g));
}
"#;

/// 水波：以 `u_center` 为圆心的径向位移
pub const RIPPLE: &str = r#"
uniform sampler2D tex;
uniform float u_time;
uniform float u_gate;
uniform vec2  u_center;
uniform float u_aspect;

void main() {
    vec2 uv = cogl_tex_coord_in[0].st;
    vec2 cuv = uv - u_center;
    cuv.y /= u_aspect;
    float r = length(cuv);
    float wave = sin(30.0 * r - 10.0 * u_time) * 0.003;
    float g = clamp(u_gate, 0.0, 1.0);
    vec2 disp = normalize(cuv) * wave * g;
    cogl_color_out = texture2D(tex, uv + disp);
}
"#;

/// 果冻：随门控淡入的正弦偏移
pub const WOBBLE: &str = r#"
uniform sampler2D tex;
uniform float u_time;
uniform float u_gate;
uniform float u_aspect;

void main() {
    vec2 uv = cogl_tex_coord_in[0].st;
    float g = clamp(u_gate, 0.0, 1.0);
    float w = 0.008;
    vec2 off;
    off.x = sin(uv.y * 30.0 + u_time * 12.0) * w * g;
    off.y = cos(uv.x * 30.0 + u_time * 10.0) * w * g;
    cogl_color_out = texture2D(tex, uv + off);
}
"#;

/// 神灯：扫描线向底边收拢，底部横向收窄
pub const GENIE: &str = r#"
uniform sampler2D tex;
uniform float u_time;
uniform float u_gate;

void main() {
    vec2 uv = cogl_tex_coord_in[0].st;
    float g = clamp(u_gate, 0.0, 1.0);
    float y = uv.y * (1.0 - g) + g;
    float pinch = mix(1.0, 0.7, pow(uv.y, 2.0) * g);
    float x = (uv.x - 0.5) * pinch + 0.5;
    cogl_color_out = texture2D(tex, vec2(x, y));
}
"#;
