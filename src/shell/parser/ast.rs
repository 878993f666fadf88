/// 收尾一个命令段的控制操作符
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlOp {
    /// 行尾命令段没有操作符
    #[default]
    None,
    /// `;`
    Sequential,
    /// `&`
    Background,
    /// `|`：仅被识别为分隔符，不建立进程间数据通道
    Pipe,
}

impl ControlOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ';' => Some(ControlOp::Sequential),
            '&' => Some(ControlOp::Background),
            '|' => Some(ControlOp::Pipe),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ControlOp::None => "",
            ControlOp::Sequential => ";",
            ControlOp::Background => "&",
            ControlOp::Pipe => "|",
        }
    }
}

/// 一个命令加上收尾它的控制操作符，按行内出现顺序产出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub argv: Vec<String>,
    pub op: ControlOp,
}

impl Segment {
    /// 连续操作符会产出空命令段，调度时按空操作处理
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}
