// ==========================================
// 印花工坊排程引擎 - 工坊配置
// ==========================================
// 职责: 定义配置文档结构,负责加载后的一次性校验
// 格式: JSON, 工序 order 取列表下标
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::DecorationMethod;

fn default_near_capacity_pct() -> f64 {
    85.0
}

fn default_equipment_type() -> String {
    "general".to_string()
}

// ==========================================
// EngineSettings - 引擎参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// 负荷率达到该值 (%) 视为接近满负荷
    #[serde(default = "default_near_capacity_pct")]
    pub near_capacity_pct: f64,

    /// 排程日起始小时 (0-23), 早于该小时的作业记入前一日
    #[serde(default)]
    pub day_start_hour: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            near_capacity_pct: default_near_capacity_pct(),
            day_start_hour: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentConfig {
    pub id: String,
    pub name: String,
    pub stage_id: String,
    pub rated_capacity: u32,
    #[serde(default = "default_equipment_type")]
    pub equipment_type: String,
}

/// 单个工艺的流水线配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodPipelineConfig {
    pub method: DecorationMethod,
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub equipment: Vec<EquipmentConfig>,
}

// ==========================================
// ShopConfig - 工坊配置根
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    pub methods: Vec<MethodPipelineConfig>,
}

impl ShopConfig {
    /// 从 JSON 文本解析并校验
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: ShopConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 查找某工艺的流水线配置
    pub fn pipeline(&self, method: DecorationMethod) -> Option<&MethodPipelineConfig> {
        self.methods.iter().find(|m| m.method == method)
    }

    /// 校验配置
    ///
    /// 规则:
    /// 1) 每个工艺至多出现一次,且至少一个工序
    /// 2) 工序ID在工艺内唯一
    /// 3) 设备ID全局唯一, 设备必须指向本工艺的工序, 额定产能 > 0
    /// 4) near_capacity_pct ∈ (0, 1000], day_start_hour < 24
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.engine.near_capacity_pct > 0.0 && self.engine.near_capacity_pct <= 1000.0) {
            return Err(ConfigError::invalid(
                "engine.near_capacity_pct",
                format!("取值 {} 超出范围 (0, 1000]", self.engine.near_capacity_pct),
            ));
        }
        if self.engine.day_start_hour >= 24 {
            return Err(ConfigError::invalid(
                "engine.day_start_hour",
                format!("取值 {} 超出范围 [0, 24)", self.engine.day_start_hour),
            ));
        }

        let mut seen_methods = HashSet::new();
        let mut seen_equipment = HashSet::new();

        for pipeline in &self.methods {
            let method = pipeline.method;
            if !seen_methods.insert(method) {
                return Err(ConfigError::invalid(
                    "methods",
                    format!("工艺 {} 重复配置", method),
                ));
            }
            if pipeline.stages.is_empty() {
                return Err(ConfigError::invalid(
                    format!("methods.{}.stages", method),
                    "工序列表不能为空",
                ));
            }

            let mut stage_ids = HashSet::new();
            for stage in &pipeline.stages {
                if stage.id.trim().is_empty() {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.stages", method),
                        "工序ID不能为空",
                    ));
                }
                if !stage_ids.insert(stage.id.as_str()) {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.stages", method),
                        format!("工序 {} 重复", stage.id),
                    ));
                }
            }

            for eq in &pipeline.equipment {
                if eq.id.trim().is_empty() {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.equipment", method),
                        "设备ID不能为空",
                    ));
                }
                if !seen_equipment.insert(eq.id.as_str()) {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.equipment", method),
                        format!("设备 {} 重复", eq.id),
                    ));
                }
                if !stage_ids.contains(eq.stage_id.as_str()) {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.equipment.{}", method, eq.id),
                        format!("工序 {} 不属于工艺 {}", eq.stage_id, method),
                    ));
                }
                if eq.rated_capacity == 0 {
                    return Err(ConfigError::invalid(
                        format!("methods.{}.equipment.{}", method, eq.id),
                        "额定产能必须大于 0",
                    ));
                }
            }
        }

        Ok(())
    }

    /// 内置默认工坊
    ///
    /// 丝网印刷: burn_screens → mix_ink → print
    /// 刺绣: digitize → hoop → stitch
    /// DTF: print_film → powder_cure → press
    /// DTG: pretreat → print → cure
    pub fn builtin() -> Self {
        fn stage(id: &str, name: &str) -> StageConfig {
            StageConfig {
                id: id.to_string(),
                name: name.to_string(),
            }
        }
        fn unit(id: &str, name: &str, stage_id: &str, cap: u32, kind: &str) -> EquipmentConfig {
            EquipmentConfig {
                id: id.to_string(),
                name: name.to_string(),
                stage_id: stage_id.to_string(),
                rated_capacity: cap,
                equipment_type: kind.to_string(),
            }
        }

        ShopConfig {
            engine: EngineSettings::default(),
            methods: vec![
                MethodPipelineConfig {
                    method: DecorationMethod::ScreenPrinting,
                    stages: vec![
                        stage("burn_screens", "Burn Screens"),
                        stage("mix_ink", "Mix Ink"),
                        stage("print", "Print"),
                    ],
                    equipment: vec![
                        unit("screen-room-1", "Screen Room 1", "burn_screens", 400, "exposure_unit"),
                        unit("screen-room-2", "Screen Room 2", "burn_screens", 400, "exposure_unit"),
                        unit("ink-station-1", "Ink Station", "mix_ink", 1200, "ink_station"),
                        unit("auto-press-1", "Auto Press 1", "print", 1500, "automatic_press"),
                        unit("manual-press-1", "Manual Press 1", "print", 300, "manual_press"),
                    ],
                },
                MethodPipelineConfig {
                    method: DecorationMethod::Embroidery,
                    stages: vec![
                        stage("digitize", "Digitize"),
                        stage("hoop", "Hoop"),
                        stage("stitch", "Stitch"),
                    ],
                    equipment: vec![
                        unit("digitizing-desk-1", "Digitizing Desk", "digitize", 200, "workstation"),
                        unit("hooping-station-1", "Hooping Station", "hoop", 600, "hooping_station"),
                        unit("emb-12head-1", "12-Head Embroidery", "stitch", 360, "embroidery_machine"),
                        unit("emb-6head-1", "6-Head Embroidery", "stitch", 180, "embroidery_machine"),
                    ],
                },
                MethodPipelineConfig {
                    method: DecorationMethod::Dtf,
                    stages: vec![
                        stage("print_film", "Print Film"),
                        stage("powder_cure", "Powder & Cure"),
                        stage("press", "Heat Press"),
                    ],
                    equipment: vec![
                        unit("dtf-printer-1", "DTF Printer", "print_film", 800, "film_printer"),
                        unit("dtf-shaker-1", "Powder Shaker", "powder_cure", 800, "shaker_dryer"),
                        unit("heat-press-1", "Heat Press 1", "press", 400, "heat_press"),
                        unit("heat-press-2", "Heat Press 2", "press", 400, "heat_press"),
                    ],
                },
                MethodPipelineConfig {
                    method: DecorationMethod::Dtg,
                    stages: vec![
                        stage("pretreat", "Pretreat"),
                        stage("print", "Print"),
                        stage("cure", "Cure"),
                    ],
                    equipment: vec![
                        unit("pretreat-1", "Pretreat Machine", "pretreat", 500, "pretreat_machine"),
                        unit("dtg-printer-1", "DTG Printer 1", "print", 250, "dtg_printer"),
                        unit("dtg-printer-2", "DTG Printer 2", "print", 250, "dtg_printer"),
                        unit("conveyor-dryer-1", "Conveyor Dryer", "cure", 900, "conveyor_dryer"),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let config = ShopConfig::builtin();
        assert!(config.validate().is_ok());
        assert_eq!(config.methods.len(), 4);
        let screen = config.pipeline(DecorationMethod::ScreenPrinting).unwrap();
        let ids: Vec<&str> = screen.stages.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["burn_screens", "mix_ink", "print"]);
    }

    #[test]
    fn test_parse_with_defaults() {
        let raw = r#"{
            "methods": [{
                "method": "dtg",
                "stages": [{"id": "print", "name": "Print"}],
                "equipment": [{"id": "p1", "name": "P1", "stage_id": "print", "rated_capacity": 10}]
            }]
        }"#;
        let config = ShopConfig::from_json_str(raw).unwrap();
        assert_eq!(config.engine, EngineSettings::default());
        assert_eq!(config.methods[0].equipment[0].equipment_type, "general");
    }

    #[test]
    fn test_reject_equipment_on_foreign_stage() {
        let mut config = ShopConfig::builtin();
        config.methods[1].equipment[0].stage_id = "burn_screens".to_string();
        match config.validate() {
            Err(ConfigError::Invalid { message, .. }) => assert!(message.contains("burn_screens")),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_duplicate_equipment_across_methods() {
        let mut config = ShopConfig::builtin();
        config.methods[3].equipment[0].id = "screen-room-1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_zero_capacity_and_bad_settings() {
        let mut config = ShopConfig::builtin();
        config.methods[0].equipment[0].rated_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ShopConfig::builtin();
        config.engine.day_start_hour = 24;
        assert!(config.validate().is_err());

        let mut config = ShopConfig::builtin();
        config.engine.near_capacity_pct = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_empty_or_duplicate_stages() {
        let mut config = ShopConfig::builtin();
        config.methods[2].stages.clear();
        config.methods[2].equipment.clear();
        assert!(config.validate().is_err());

        let mut config = ShopConfig::builtin();
        config.methods[0].stages.push(StageConfig {
            id: "print".to_string(),
            name: "Print again".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_duplicate_method() {
        let mut config = ShopConfig::builtin();
        let dup = config.methods[0].clone();
        config.methods.push(MethodPipelineConfig {
            equipment: vec![],
            ..dup
        });
        assert!(config.validate().is_err());
    }
}
