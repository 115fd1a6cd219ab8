// ==========================================
// 印花工坊排程引擎 - 工序流水线定义
// ==========================================
// 职责: 每个工艺一条有序工序列表, 定义合法的前进方向
// 约束: 由配置数据驱动, 新增工艺/工序无需改代码
// ==========================================

use std::collections::HashMap;

use crate::config::ShopConfig;
use crate::domain::stage::Stage;
use crate::domain::types::DecorationMethod;

pub struct StagePipeline {
    pipelines: HashMap<DecorationMethod, Vec<Stage>>,
}

impl StagePipeline {
    /// 由已校验的配置构建, order 取配置列表下标
    pub fn from_config(config: &ShopConfig) -> Self {
        let pipelines = config
            .methods
            .iter()
            .map(|pipeline| {
                let stages = pipeline
                    .stages
                    .iter()
                    .enumerate()
                    .map(|(order, stage)| Stage {
                        id: stage.id.clone(),
                        name: stage.name.clone(),
                        order: order as u32,
                        decoration_method: pipeline.method,
                    })
                    .collect();
                (pipeline.method, stages)
            })
            .collect();

        Self { pipelines }
    }

    /// 某工艺的有序工序; 未配置的工艺返回空
    pub fn stages_for(&self, method: DecorationMethod) -> &[Stage] {
        self.pipelines
            .get(&method)
            .map(|stages| stages.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_stage(&self, method: DecorationMethod) -> Option<&Stage> {
        self.stages_for(method).first()
    }

    pub fn stage(&self, method: DecorationMethod, stage_id: &str) -> Option<&Stage> {
        self.stages_for(method).iter().find(|s| s.id == stage_id)
    }

    /// 下一道工序
    ///
    /// # 返回
    /// - `Some(stage)`: 下一道工序
    /// - `None`: current 已是末道工序, 或 current 不属于该工艺
    pub fn next_stage(&self, method: DecorationMethod, current: &str) -> Option<&Stage> {
        let stages = self.stages_for(method);
        let idx = stages.iter().position(|s| s.id == current)?;
        stages.get(idx + 1)
    }

    pub fn is_valid_stage(&self, method: DecorationMethod, stage_id: &str) -> bool {
        self.stage(method, stage_id).is_some()
    }

    pub fn is_terminal(&self, method: DecorationMethod, stage_id: &str) -> bool {
        self.stages_for(method)
            .last()
            .map(|s| s.id == stage_id)
            .unwrap_or(false)
    }

    /// 已配置的工艺 (稳定顺序)
    pub fn methods(&self) -> Vec<DecorationMethod> {
        let mut methods: Vec<DecorationMethod> = self.pipelines.keys().copied().collect();
        methods.sort();
        methods
    }
}
