use nalgebra::Vector4;

// 메모리상 바이트 순서가 언제나 R, G, B, A가 되도록 ne 사용
pub fn vec4_to_rgba(color: &Vector4<f32>) -> u32 {
    let [r, g, b, a] = [color.x, color.y, color.z, color.w].map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
    u32::from_ne_bytes([r, g, b, a])
}

pub fn rgba_to_vec4(rgba: u32) -> Vector4<f32> {
    let [r, g, b, a] = rgba.to_ne_bytes().map(|channel| channel as f32 / 255.0);
    Vector4::new(r, g, b, a)
}
