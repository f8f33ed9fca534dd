//! Figures for the first volume (2級).

use crate::canvas::{
    BLACK, BLUE, Canvas, GRAY, GREEN, LAVENDER, LIGHT_BLUE, LIGHT_CORAL, LIGHT_GREEN, LIGHT_YELLOW,
    ORANGE, PURPLE, RED, Shape, TextStyle, hex, tint,
};

pub fn cad_vs_bim(c: &mut Canvas) {
    c.panel(0, 0, 2, 1);
    c.title("従来のCAD", TextStyle::new(14.0).bold());
    for (label, y) in [("平面図", 0.8), ("立面図", 0.5), ("断面図", 0.2)] {
        c.label(0.5, y, label, TextStyle::new(12.0), LIGHT_BLUE);
    }
    c.text(0.5, 0.05, "（個別に作図・管理）", TextStyle::new(10.0).color(GRAY));

    c.panel(1, 0, 2, 1);
    c.title("BIM", TextStyle::new(14.0).bold());
    c.circle(0.5, 0.5, 0.2, Shape::fill(tint(ORANGE, 0.3)));
    c.text(0.5, 0.5, "BIMモデル\n（単一の情報源）", TextStyle::new(11.0).bold());

    let derived = tint(LIGHT_GREEN, 0.7);
    c.arrow((0.5, 0.3), (0.2, 0.15), GRAY, 1.5);
    c.label(0.15, 0.1, "平面図", TextStyle::new(9.0).left(), derived);
    c.arrow((0.5, 0.7), (0.2, 0.85), GRAY, 1.5);
    c.label(0.15, 0.88, "立面図", TextStyle::new(9.0).left(), derived);
    c.arrow((0.5, 0.5), (0.8, 0.5), GRAY, 1.5);
    c.label(0.82, 0.5, "断面図", TextStyle::new(9.0).left(), derived);
    c.text(0.5, 0.02, "（自動生成・整合性保証）", TextStyle::new(10.0).color(GRAY));
}

pub fn info_layers(c: &mut Canvas) {
    c.title("BIMモデルの構成要素", TextStyle::new(14.0).bold());

    let layers = [
        ("形状情報\n(Geometry)", 0.7, LIGHT_BLUE, "• 長さ、幅、高さ\n• 3D形状"),
        ("属性情報\n(Property)", 0.45, LIGHT_GREEN, "• 材質、仕上げ\n• コスト、性能"),
        ("関係情報\n(Relationship)", 0.2, LIGHT_YELLOW, "• 接続、配置\n• 階層構造"),
    ];
    for (label, y, color, notes) in layers {
        c.rect(0.2, y - 0.08, 0.6, 0.15, Shape::fill(tint(color, 0.7)).stroke(BLACK, 2.0));
        c.text(0.5, y, label, TextStyle::new(12.0).bold());
        c.text(0.02, y, notes, TextStyle::new(9.0).left());
    }
}

pub fn lifecycle_flow(c: &mut Canvas) {
    c.title("建築生産プロセスとBIM", TextStyle::new(14.0).bold());
    c.limits((0.0, 1.0), (0.15, 0.95));

    let phases = [
        ("企画", "LOD 100", hex(0xFFE6E6)),
        ("設計", "LOD 200-300", hex(0xE6F3FF)),
        ("施工", "LOD 400", hex(0xE6FFE6)),
        ("維持管理", "LOD 500", hex(0xFFF9E6)),
    ];
    for (i, (phase, lod, color)) in phases.iter().enumerate() {
        let x = i as f32 * 0.23 + 0.1;
        c.round_rect(x, 0.6, 0.18, 0.25, Shape::fill(*color).stroke(BLACK, 2.0));
        c.text(x + 0.09, 0.76, phase, TextStyle::new(12.0).bold());
        c.text(x + 0.09, 0.66, lod, TextStyle::new(9.0).color(GRAY));
        if i + 1 < phases.len() {
            c.arrow((x + 0.185, 0.72), (x + 0.225, 0.72), GRAY, 1.5);
        }
    }

    c.line((0.1, 0.45), (0.92, 0.45), BLUE, 3.0);
    c.text(0.51, 0.49, "同一モデルの段階的詳細化", TextStyle::new(11.0).color(BLUE).bold());

    for i in 0..4 {
        let x = i as f32 * 0.23 + 0.19;
        c.dashed_line((x - 0.09, 0.3), (x + 0.09, 0.3), RED, 2.0);
        if i < 3 {
            c.text(x + 0.12, 0.25, "断絶", TextStyle::new(8.0).color(RED).left());
        }
    }
    c.text(0.51, 0.35, "従来手法: 各段階で情報が分断", TextStyle::new(10.0).color(RED));
    c.legend(&[("BIMモデルの継続", BLUE), ("従来手法", RED)]);
}

pub fn element_structure(c: &mut Canvas) {
    c.title("BIM部材（Element）の構造", TextStyle::new(14.0).bold());
    c.limits((0.0, 1.0), (0.0, 0.85));

    c.round_rect(0.35, 0.6, 0.3, 0.15, Shape::fill(tint(ORANGE, 0.5)).stroke(BLACK, 3.0));
    c.text(0.5, 0.675, "壁オブジェクト\n(Element)", TextStyle::new(13.0).bold());

    let branches = [
        (0.05, "形状情報", BLUE, LIGHT_BLUE, "• 長さ: 5,000mm\n• 高さ: 2,700mm\n• 厚さ: 200mm", (0.35, 0.65), (0.23, 0.52)),
        (0.7, "属性情報", GREEN, LIGHT_GREEN, "• 材質: RC\n• 仕上: EP-1\n• コスト: ¥85,000/㎡", (0.65, 0.65), (0.77, 0.52)),
    ];
    for (x, title, edge, fill, notes, from, to) in branches {
        c.rect(x, 0.3, 0.25, 0.2, Shape::fill(tint(fill, 0.7)).stroke(edge, 2.0));
        c.text(x + 0.125, 0.47, title, TextStyle::new(11.0).color(edge).bold());
        c.text(x + 0.125, 0.44, notes, TextStyle::new(9.0).top());
        c.arrow(from, to, edge, 2.0);
    }

    c.text(0.5, 0.2, "↓ 自動生成 ↓", TextStyle::new(11.0).color(PURPLE).bold());
    for (i, output) in ["平面図", "立面図", "断面図", "数量表", "集計表"].iter().enumerate() {
        let x = 0.1 + i as f32 * 0.18;
        c.rect(x, 0.05, 0.14, 0.08, Shape::fill(tint(LAVENDER, 0.6)).stroke(PURPLE, 1.5));
        c.text(x + 0.07, 0.09, output, TextStyle::new(9.0));
    }
}

pub fn lod_matrix(c: &mut Canvas) {
    c.title("LOD（Level of Development）マトリクス", TextStyle::new(14.0).bold());

    let rows = [
        ("LOD 100", "企画", "概念モデル", "ボリューム・配置", hex(0xFFE6E6)),
        ("LOD 200", "基本設計", "概略モデル", "主要部材の位置・サイズ", hex(0xFFD9B3)),
        ("LOD 300", "実施設計", "詳細モデル", "詳細形状・主要属性", hex(0xFFFFCC)),
        ("LOD 400", "施工図", "製作モデル", "製作・施工詳細", hex(0xD9FFD9)),
        ("LOD 500", "竣工・維持管理", "竣工モデル", "実測値・as-built", hex(0xCCE5FF)),
    ];

    let header = TextStyle::new(12.0).bold();
    c.text(0.125, 0.9, "LOD", header);
    c.text(0.25, 0.9, "フェーズ", header.left());
    c.text(0.45, 0.9, "モデルタイプ", header.left());
    c.text(0.65, 0.9, "内容", header.left());

    for (i, (lod, phase, model, content, color)) in rows.iter().enumerate() {
        let y = 0.8 - i as f32 * 0.15;
        c.rect(0.05, y - 0.05, 0.15, 0.08, Shape::fill(tint(*color, 0.8)).stroke(BLACK, 2.0));
        c.text(0.125, y - 0.01, lod, TextStyle::new(11.0).bold());
        c.text(0.25, y - 0.01, phase, TextStyle::new(10.0).left());
        c.text(0.45, y - 0.01, model, TextStyle::new(10.0).color(GRAY).left());
        c.text(0.65, y - 0.01, content, TextStyle::new(9.0).left());
    }

    c.arrow((0.92, 0.75), (0.92, 0.1), BLUE, 3.0);
    c.text(0.95, 0.425, "詳細化\n↓", TextStyle::new(11.0).color(BLUE).bold().left());
}

pub fn openbim_ifc(c: &mut Canvas) {
    c.title("OPEN BIM - IFCによるソフトウェア間連携", TextStyle::new(14.0).bold());
    c.limits((0.0, 1.0), (0.05, 0.85));

    let tools = [
        ("Revit\n(意匠)", 0.2, 0.7, LIGHT_BLUE),
        ("ArchiCAD\n(意匠)", 0.5, 0.7, LIGHT_BLUE),
        ("Rebro\n(設備)", 0.8, 0.7, LIGHT_GREEN),
        ("積算ソフト", 0.2, 0.3, LIGHT_YELLOW),
        ("構造解析", 0.5, 0.3, LIGHT_CORAL),
        ("BIM360\n(施工)", 0.8, 0.3, LAVENDER),
    ];

    // Connectors first so the boxes and hub sit on top.
    let link = tint(BLUE, 0.5);
    for (_, x, y, _) in tools {
        c.dashed_line((x, y), (0.5, 0.5), link, 1.5);
        let (dx, dy) = (0.5 - x, 0.5 - y);
        let len = (dx * dx + dy * dy).sqrt();
        let (ux, uy) = (dx / len, dy / len);
        c.arrow((x + ux * 0.06, y + uy * 0.06), (x + ux * 0.16, y + uy * 0.16), link, 1.0);
    }

    for (name, x, y, color) in tools {
        c.round_rect(x - 0.08, y - 0.05, 0.16, 0.08, Shape::fill(color).stroke(BLACK, 1.5));
        c.text(x, y - 0.01, name, TextStyle::new(9.0));
    }

    c.circle(0.5, 0.5, 0.12, Shape::fill(tint(ORANGE, 0.6)).stroke(BLACK, 3.0));
    c.text(0.5, 0.5, "IFC\n(共通フォーマット)", TextStyle::new(11.0).bold());
    c.text(0.5, 0.1, "※ IFCを中心に異なるソフトウェア間でデータ交換", TextStyle::new(10.0).color(GRAY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WHITE;

    #[test]
    fn every_routine_draws_something() {
        let routines: [(&str, fn(&mut Canvas)); 6] = [
            ("cad_vs_bim", cad_vs_bim),
            ("info_layers", info_layers),
            ("lifecycle_flow", lifecycle_flow),
            ("element_structure", element_structure),
            ("lod_matrix", lod_matrix),
            ("openbim_ifc", openbim_ifc),
        ];
        for (name, draw) in routines {
            let mut canvas = Canvas::new(600, 360, None);
            draw(&mut canvas);
            let painted = canvas.image().pixels().filter(|p| **p != WHITE).count();
            assert!(painted > 100, "{name} left the canvas blank");
        }
    }
}
