//! Minimal registry exports shared by the unit tests.

pub const APPLICATION_FILE: &str = "Заявление о выдаче лицензии.xml";
pub const REGISTRY_FILE: &str =
    "Выписка из ЕГРЮЛ по запросам органов государственной власти (СМЭВ 3).xml";
pub const TAX_DEBT_FILE: &str =
    "ФНС. Cведения о наличии (отсутствии) задолженности свыше 3000 рублей.xml";
pub const DUTY_FILE: &str = "РНиП. Cведения об оплатах [запрос+ответ].xml";
pub const CADASTRAL_FILE: &str =
    "Выписка из ЕГРН об объекте недвижимости [из zip-файла, находящегося в ЦХЭД].xml";

pub fn application(tax_id: &str, kpp: &str, cadastral: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ns:CoordinateSendRequest xmlns:ns="http://asguf.mos.ru/rkis_gu/coordinate/v6_1/">
  <ns:Contacts>
    <ns:BaseDeclarant>
      <ns:FullName>ООО "Ромашка"</ns:FullName>
      <ns:Inn>{tax_id}</ns:Inn>
      <ns:Kpp>{kpp}</ns:Kpp>
    </ns:BaseDeclarant>
  </ns:Contacts>
  <ns:CustomAttributes>
    <license_data>
      <separate_division>
        <name_unit>Магазин у Автозаводской</name_unit>
        <address>
          <pobox>г. Москва, ул. Автозаводская, д. 18</pobox>
        </address>
        <cadastral_number>{cadastral}</cadastral_number>
      </separate_division>
      <separate_division>
        <name_unit>Склад</name_unit>
        <address>
          <pobox></pobox>
          <street>ул. Складская, 3</street>
        </address>
      </separate_division>
    </license_data>
  </ns:CustomAttributes>
</ns:CoordinateSendRequest>"#
    )
}

pub fn company_registry(tax_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Файл ИдФайл="EGRUL_1" ВерсФорм="4.03">
  <Документ ИдДок="1">
    <СвЮЛ ОГРН="1027700000001" ИНН="{tax_id}" КПП="772501001">
      <СвНаимЮЛ НаимЮЛПолн="ОБЩЕСТВО С ОГРАНИЧЕННОЙ ОТВЕТСТВЕННОСТЬЮ &quot;РОМАШКА&quot;"/>
    </СвЮЛ>
  </Документ>
</Файл>"#
    )
}

pub fn tax_debt(flag: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Файл ИдФайл="FNS_1">
  <ЗагДок>Сведения о наличии (отсутствии) ЗАДОЛЖЕННОСТИ свыше 3000 рублей</ЗагДок>
  <tns:INFZDLResponse xmlns:tns="urn://x-artefacts-fns-zadorg/root/548-04/4.0.5" ПрЗадолж="{flag}"/>
</Файл>"#
    )
}

pub fn duty_payment(amount_minor: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ExportPaymentsResponse xmlns="urn://roskazna.ru/gisgmp/xsd/services/export-payments/2.4.0">
  <pi:PaymentInfo xmlns:pi="urn://roskazna.ru/gisgmp/xsd/Payment/2.4.0" paymentId="10471020010005678901234567890" amount="{amount_minor}"/>
</ExportPaymentsResponse>"#
    )
}

pub fn cadastral(number: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<extract_about_property_building>
  <building_record>
    <object>
      <common_data>
        <cad_number>{number}</cad_number>
      </common_data>
    </object>
    <params>
      <area>120.5</area>
      <purpose>
        <code>204002000000</code>
        <value>Нежилое</value>
      </purpose>
    </params>
  </building_record>
</extract_about_property_building>"#
    )
}
