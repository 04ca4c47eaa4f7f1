use crate::utils::error::Result;

/// 扁平檔案儲存，路徑相對於輸出根目錄
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
    fn display_path(&self, path: &str) -> String;
}

/// 每個 stage 都是一個 extract / transform / load 流程
pub trait Pipeline {
    type Extracted;
    type Transformed;

    fn name(&self) -> &str;
    fn extract(&self) -> Result<Self::Extracted>;
    fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    fn load(&self, result: Self::Transformed) -> Result<String>;
}
