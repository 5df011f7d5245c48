//! PCA sales detail (売上明細) import layout.
//!
//! The field order, header names, and declared widths are the contract with
//! the accounting system. They are listed here explicitly, never inferred
//! from record contents.

use crate::core::ValidationError;

use super::record::PcaRecord;

/// Version of the layout below. Bump when fields are added, removed, or
/// reordered.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of fields in one sales detail record.
pub const FIELD_COUNT: usize = 72;

/// How a field's value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Identifier, zero-padded on the left to the field width.
    Code,
    /// Free text, cut to the field width in characters.
    Text,
    /// Plain decimal string, no thousands separators.
    Number,
    /// `YYYYMMDD`, or `"0"` when unset.
    Date,
    /// Fixed classification code (区分).
    Flag,
}

/// Descriptor of one field in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    /// Header name expected by PCA.
    pub name: &'static str,
    /// Maximum width: characters for text and codes, digits for numbers.
    pub width: usize,
    pub kind: FieldKind,
}

macro_rules! layout {
    ($($variant:ident => $name:literal, $width:literal, $kind:ident;)*) => {
        /// A field of the sales detail layout, in layout order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($variant,)*
        }

        /// The full layout, in export order.
        pub const FIELDS: [FieldSpec; FIELD_COUNT] = [
            $(FieldSpec {
                field: Field::$variant,
                name: $name,
                width: $width,
                kind: FieldKind::$kind,
            },)*
        ];
    };
}

layout! {
    SlipType => "伝区", 1, Flag;
    SalesDate => "売上日", 8, Date;
    BillingDate => "請求日", 8, Date;
    SlipNo => "伝票No", 8, Code;
    CustomerCode => "得意先コード", 13, Code;
    CustomerName => "得意先名", 40, Text;
    ShipToCode => "直送先コード", 13, Code;
    ShipToName => "直送先名", 40, Text;
    ContactName => "先方担当者名", 30, Text;
    DepartmentCode => "部門コード", 6, Code;
    StaffCode => "担当者コード", 13, Code;
    MemoCode => "摘要コード", 6, Code;
    MemoName => "摘要名", 30, Text;
    CategoryCode => "分類コード", 4, Code;
    SlipCategory => "伝票区分", 2, Flag;
    ProductCode => "商品コード", 13, Code;
    MasterKind => "マスター区分", 1, Flag;
    ProductName => "商品名", 36, Text;
    LineKind => "区", 1, Flag;
    WarehouseCode => "倉庫コード", 6, Code;
    PackSize => "入数", 10, Number;
    CaseCount => "箱数", 11, Number;
    Quantity => "数量", 9, Number;
    Unit => "単位", 4, Text;
    UnitPrice => "単価", 10, Number;
    SalesAmount => "売上金額", 11, Number;
    UnitCost => "原単価", 9, Number;
    CostAmount => "原価金額", 11, Number;
    GrossProfit => "粗利益", 11, Number;
    ExclusiveTax => "外税額", 11, Number;
    InclusiveTax => "内税額", 11, Number;
    TaxCategory => "税区分", 1, Flag;
    TaxInclusion => "税込区分", 1, Flag;
    Remarks => "備考", 20, Text;
    StandardPrice => "標準価格", 9, Number;
    SimultaneousReceipt => "同時入荷区分", 1, Flag;
    SellingUnitPrice => "売単価", 10, Number;
    SellingAmount => "売価金額", 11, Number;
    ModelNumber => "規格型番", 36, Text;
    Color => "色", 7, Text;
    Size => "サイズ", 5, Text;
    FormulaCode => "計算式コード", 2, Flag;
    ProductItem1 => "商品項目１", 12, Number;
    ProductItem2 => "商品項目２", 12, Number;
    ProductItem3 => "商品項目３", 12, Number;
    SalesItem1 => "売上項目１", 12, Number;
    SalesItem2 => "売上項目２", 12, Number;
    SalesItem3 => "売上項目３", 12, Number;
    TaxRate => "税率", 5, Number;
    SlipTax => "伝票消費税額", 11, Number;
    ProjectCode => "プロジェクトコード", 16, Code;
    SlipNo2 => "伝票No2", 16, Text;
    DataKind => "データ区分", 1, Flag;
    ProductName2 => "商品名２", 256, Text;
    UnitKind => "単位区分", 1, Flag;
    LotNo => "ロットNo", 20, Text;
    SettlementCompanyCode => "決済会社コード", 13, Code;
    SettlementCompanyName => "決済会社名", 40, Text;
    SettlementDate => "決済日", 8, Date;
    SettlementFee => "決済手数料", 11, Number;
    FeeExclusiveTax => "手数料外税額", 11, Number;
    FeeInclusiveTax => "手数料内税額", 11, Number;
    FeeTaxCategory => "手数料税区分", 1, Flag;
    FeeTaxRate => "手数料税率", 5, Number;
    FeeTaxInclusion => "手数料税込区分", 1, Flag;
    SettlementMemoCode => "決済摘要コード", 6, Code;
    SettlementMemoName => "決済摘要名", 30, Text;
    SalesTaxType => "売上税種別", 1, Flag;
    CostTaxInclusion => "原価税込区分", 1, Flag;
    CostTaxRate => "原価税率", 5, Number;
    CostTaxType => "原価税種別", 1, Flag;
    BillToCode => "請求先コード", 13, Code;
}

impl Field {
    /// Position of the field in a record.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self.index()]
    }

    /// Header name expected by PCA.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look a field up by its PCA header name.
    pub fn from_name(name: &str) -> Option<Field> {
        FIELDS.iter().find(|s| s.name == name).map(|s| s.field)
    }
}

/// Header names in layout order.
pub fn header_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|s| s.name)
}

/// Report values that exceed their field's declared width.
///
/// Codes and text count characters; numbers count digits only, so a sign or
/// decimal point does not count against the width. Dates are exempt.
pub fn check_widths(records: &[PcaRecord]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (row, record) in records.iter().enumerate() {
        for spec in FIELDS.iter() {
            let value = record.get(spec.field);
            let used = match spec.kind {
                FieldKind::Number => value.chars().filter(char::is_ascii_digit).count(),
                FieldKind::Date => continue,
                FieldKind::Code | FieldKind::Text | FieldKind::Flag => value.chars().count(),
            };
            if used > spec.width {
                errors.push(ValidationError::new(
                    format!("records[{row}].{}", spec.name),
                    format!(
                        "'{value}' uses {used} of {} allowed {}",
                        spec.width,
                        if spec.kind == FieldKind::Number {
                            "digits"
                        } else {
                            "characters"
                        }
                    ),
                ));
            }
        }
    }
    errors
}
