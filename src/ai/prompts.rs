//! Prompt templates, all in Indonesian

use crate::dtos::{CaptionRequestDTO, ExpenseSummaryDTO, PricingStrategyRequestDTO};
use crate::entities::Calculation;
use std::fmt::Write;

pub const COACH_SYSTEM: &str = "Kamu adalah GenHPP Coach, konsultan bisnis yang ramah untuk pelaku UMKM di Indonesia. \
Jawab dalam Bahasa Indonesia yang sederhana dan praktis. Fokus pada harga pokok produksi, \
penetapan harga, pemasaran, dan pengelolaan keuangan usaha kecil. Jika pertanyaan di luar \
topik bisnis, arahkan kembali dengan sopan.";

pub const ANALYST_SYSTEM: &str = "Kamu adalah analis keuangan UMKM. Selalu jawab dalam Bahasa Indonesia \
dan kembalikan HANYA dokumen JSON sesuai format yang diminta, tanpa teks lain.";

pub const COPYWRITER_SYSTEM: &str = "Kamu adalah copywriter media sosial untuk UMKM Indonesia. \
Tulis caption yang hangat, singkat, dan mengajak membeli. Kembalikan hanya teks caption.";

pub const COACH_FALLBACK: &str = "Maaf, GenHPP Coach sedang tidak dapat dihubungi. \
Silakan coba lagi beberapa saat lagi.";

/// Formats an amount as `Rp 12.500` (Indonesian thousands separator, no decimals)
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

pub fn hpp_analysis(calculation: &Calculation) -> String {
    let mut materials = String::new();
    for material in calculation.materials.iter() {
        let _ = writeln!(materials, "- {}: {}", material.name, format_rupiah(material.cost));
    }
    if materials.is_empty() {
        materials.push_str("- (tidak ada bahan)\n");
    }

    format!(
        "Analisis perhitungan HPP berikut.\n\
         Produk: {product}\n\
         Jumlah produksi: {units} unit\n\
         Bahan baku:\n{materials}\
         Tenaga kerja: {labor}\n\
         Overhead: {overhead}\n\
         Kemasan: {packaging}\n\
         Total HPP: {hpp} ({hpp_unit} per unit)\n\
         Margin: {margin}%\n\
         Harga jual saran per unit: {price_unit}\n\n\
         Balas dengan JSON: {{\"summary\": string, \"cost_saving_tips\": [string], \"pricing_advice\": string}}. \
         Berikan 2 sampai 5 tips penghematan biaya yang spesifik.",
        product = calculation.product_name,
        units = calculation.units_produced,
        materials = materials,
        labor = format_rupiah(calculation.labor_cost),
        overhead = format_rupiah(calculation.overhead_cost),
        packaging = format_rupiah(calculation.packaging_cost),
        hpp = format_rupiah(calculation.hpp),
        hpp_unit = format_rupiah(calculation.hpp_per_unit),
        margin = calculation.margin_percent,
        price_unit = format_rupiah(calculation.suggested_price_per_unit),
    )
}

pub fn pricing_strategy(request: &PricingStrategyRequestDTO) -> String {
    let competitor = request
        .competitor_price
        .map(format_rupiah)
        .unwrap_or_else(|| "tidak diketahui".to_string());
    let market = request.target_market.as_deref().unwrap_or("umum");

    format!(
        "Susun strategi harga untuk produk \"{}\".\n\
         HPP per unit: {}\n\
         Harga pesaing: {}\n\
         Target pasar: {}\n\n\
         Balas dengan JSON: {{\"recommended_price\": number, \"strategy\": string, \"reasoning\": string}}. \
         recommended_price dalam rupiah per unit dan tidak boleh di bawah HPP.",
        request.product_name,
        format_rupiah(request.hpp_per_unit),
        competitor,
        market,
    )
}

pub fn expense_insight(summary: &ExpenseSummaryDTO) -> String {
    let period = match (summary.from, summary.to) {
        (Some(from), Some(to)) => format!("{} s.d. {}", from, to),
        (Some(from), None) => format!("sejak {}", from),
        (None, Some(to)) => format!("hingga {}", to),
        (None, None) => "seluruh periode".to_string(),
    };

    let mut categories = String::new();
    for row in &summary.by_category {
        let _ = writeln!(
            categories,
            "- {}: {} ({} transaksi)",
            row.label,
            format_rupiah(row.total),
            row.count
        );
    }

    format!(
        "Berikut ringkasan pengeluaran usaha untuk {period}.\n\
         Total: {total} dari {count} transaksi.\n\
         Per kategori:\n{categories}\n\
         Balas dengan JSON: {{\"insight\": string, \"saving_suggestions\": [string]}}. \
         Berikan 2 sampai 5 saran penghematan yang realistis untuk UMKM.",
        period = period,
        total = format_rupiah(summary.total),
        count = summary.count,
        categories = categories,
    )
}

pub fn marketing_caption(request: &CaptionRequestDTO) -> String {
    let mut prompt = format!("Buat caption promosi untuk produk \"{}\".\n", request.product_name);
    if let Some(description) = &request.description {
        let _ = writeln!(prompt, "Deskripsi: {}", description);
    }
    if let Some(price) = request.price {
        let _ = writeln!(prompt, "Harga: {}", format_rupiah(price));
    }
    let platform = request.platform.as_deref().unwrap_or("Instagram");
    let _ = write!(
        prompt,
        "Platform: {}. Maksimal 80 kata, sertakan ajakan membeli dan 3 sampai 5 hashtag.",
        platform
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(950.0), "Rp 950");
        assert_eq!(format_rupiah(12500.0), "Rp 12.500");
        assert_eq!(format_rupiah(1234567.4), "Rp 1.234.567");
        assert_eq!(format_rupiah(-2500.0), "-Rp 2.500");
    }

    #[test]
    fn test_caption_prompt_defaults_platform() {
        let prompt = marketing_caption(&CaptionRequestDTO {
            product_name: "Keripik Pedas".to_string(),
            description: None,
            price: Some(15000.0),
            platform: None,
        });
        assert!(prompt.contains("Keripik Pedas"));
        assert!(prompt.contains("Rp 15.000"));
        assert!(prompt.contains("Instagram"));
    }
}
