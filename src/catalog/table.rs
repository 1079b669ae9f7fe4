//! SymbCtrl mk2 register map and lookup tables

use super::AccessMode::{ReadOnly as R, ReadWrite as RW, WriteOnly as W};
use super::Register;
use crate::codec::WireType::*;

#[rustfmt::skip]
pub(super) static REGISTERS: &[Register] = &[
    // names, 16 characters each
    Register::new("ModelName",        170, R,  Text,       "Controller model name"),
    Register::new("ControlName",      178, RW, Text,       "User assigned controller name"),
    Register::new("WQName",           186, RW, Text,       "Water quality sensor description"),
    Register::new("Temp1Name",        194, RW, Text,       "Temperature sensor 1 description"),
    Register::new("Temp2Name",        202, RW, Text,       "Temperature sensor 2 description"),
    Register::new("Input1Name",       210, RW, Text,       "Input 1 description"),
    Register::new("Input2Name",       218, RW, Text,       "Input 2 description"),
    Register::new("Relay1Name",       226, RW, Text,       "Relay 1 description"),
    Register::new("Relay2Name",       234, RW, Text,       "Relay 2 description"),
    Register::new("Output1Name",      242, RW, Text,       "Digital output 1 description"),
    Register::new("Output2Name",      250, RW, Text,       "Digital output 2 description"),
    Register::new("Control1Name",     258, RW, Text,       "Description of control loop 1"),
    Register::new("Control2Name",     266, RW, Text,       "Description of control loop 2"),
    Register::new("Control3Name",     274, RW, Text,       "Description of control loop 3"),
    Register::new("Control4Name",     282, RW, Text,       "Description of control loop 4"),
    // holding registers
    Register::new("StatusCode",         0, R,  UInt16,     "Current controller status code, 0=good"),
    Register::new("ModelNumber",        1, R,  UInt16,     "Model number of the Symbrosia Controller"),
    Register::new("SerialNumber",       2, R,  UInt16,     "Serial number of the Symbrosia controller"),
    Register::new("FirmwareRev",        3, R,  UInt16,     "Firmware version, major in upper byte, minor in lower byte"),
    Register::new("HeartbeatIn",        4, RW, UInt16,     "Heartbeat, value written will be echoed in HeartbeatOut"),
    Register::new("HeartbeatOut",       5, R,  UInt16,     "Heartbeat echo of value written to HeartbeatIn"),
    Register::new("StatusDisp1",        8, RW, UInt16,     "Value to be shown on status screen position 1"),
    Register::new("StatusDisp2",        9, RW, UInt16,     "Value to be shown on status screen position 2"),
    Register::new("TimeZone",          10, RW, Int16,      "Controller timezone").unit("h"),
    Register::new("Date",              11, R,  Date,       "Current controller date from NTP time"),
    Register::new("Time",              14, R,  Time,       "Current controller time from NTP time"),
    Register::new("DateTime",          11, R,  DateTime,   "Current controller date and time from NTP time"),
    Register::new("Year",              11, R,  UInt16,     "Current Full year from NTP time"),
    Register::new("Month",             12, R,  UInt16,     "Current month from NTP time, 0=January"),
    Register::new("Day",               13, R,  UInt16,     "Current day from NTP time"),
    Register::new("Hour",              14, R,  UInt16,     "Current hour from NTP time").unit("h"),
    Register::new("Minute",            15, R,  UInt16,     "Current minute from NTP time").unit("m"),
    Register::new("Second",            16, R,  UInt16,     "Current second from NTP time").unit("s"),
    Register::new("WQSensor",          20, R,  Float32,    "Calibrated reading of the water quality sensor").unit_register("WQSensorUnits").validity("WQSensorValid"),
    Register::new("Temperature1",      22, R,  Float32,    "Calibrated reading from temperature sensor 1").unit_register("Temp1Units").validity("Temp1Valid"),
    Register::new("Temperature2",      24, R,  Float32,    "Calibrated reading from temperature sensor 2").unit_register("Temp2Units").validity("Temp2Valid"),
    Register::new("Analog1",           26, R,  Float32,    "Calibrated reading from analog input 1").unit_register("Analog1Units").validity("Analog1Valid"),
    Register::new("Analog2",           28, R,  Float32,    "Calibrated reading from analog input 2").unit_register("Analog2Units").validity("Analog2Valid"),
    Register::new("InternalTemp",      30, R,  Float32,    "Controller internal temperature").unit_register("IntTempUnits").validity("LocalTempValid"),
    Register::new("SupplyVoltage",     32, R,  Float32,    "Controller supply voltage").unit_register("SupVoltUnits").validity("SupVoltValid"),
    Register::new("ProcessedData",     34, R,  Float32,    "Result of data processing").unit_register("ProcessedUnits").validity("ProcReadValid"),
    Register::new("WQSensorUnits",     36, RW, UInt16,     "Units for the water quality sensor, 3=pH, 4=mV"),
    Register::new("Temp1Units",        37, RW, UInt16,     "Units for temperature sensor 1, 1=°C or 2=°F"),
    Register::new("Temp2Units",        38, RW, UInt16,     "Units for temperature sensor 2, 1=°C or 2=°F"),
    Register::new("Analog1Units",      39, RW, UInt16,     "Units for analog input 1"),
    Register::new("Analog2Units",      40, RW, UInt16,     "Units for analog input 2"),
    Register::new("IntTempUnits",      41, RW, UInt16,     "Controller internal temperature units, 1=°C or 2=°F"),
    Register::new("SupVoltUnits",      42, RW, UInt16,     "Controller supply voltage unit is volts"),
    Register::new("ProcessedUnits",    43, RW, UInt16,     "Units for the processed data result"),
    Register::new("pHTempComp",        44, RW, UInt16,     "pH temperature calibration source"),
    Register::new("WQOffset",          50, RW, Float32,    "Calibration offset for the WQ sensor amplifier").unit_register("WQSensorUnits"),
    Register::new("Temp1Offset",       52, RW, Float32,    "Calibration offset for temperature sensor 1").unit_register("Temp1Units"),
    Register::new("Temp2Offset",       54, RW, Float32,    "Calibration offset for temperature sensor 2").unit_register("Temp2Units"),
    Register::new("Analog1Offset",     56, RW, Float32,    "Calibration offset for analog input 1").unit_register("Analog1Units"),
    Register::new("Analog2Offset",     58, RW, Float32,    "Calibration offset for analog input 2").unit_register("Analog2Units"),
    Register::new("WQGain",            60, RW, Float32,    "Calibration gain for the WQ sensor amplifier"),
    Register::new("Temp1Gain",         62, RW, Float32,    "Calibration gain for temperature sensor 1"),
    Register::new("Temp2Gain",         64, RW, Float32,    "Calibration gain for temperature sensor 2"),
    Register::new("Analog1Gain",       66, RW, Float32,    "Calibration gain for analog input 1"),
    Register::new("Analog2Gain",       68, RW, Float32,    "Calibration gain for analog input 2"),
    Register::new("Ctrl1Input",        70, RW, UInt16,     "Control loop 1 input source"),
    Register::new("Ctrl1Output",       71, RW, UInt16,     "Control loop 1 output"),
    Register::new("Ctrl1Setpoint",     72, RW, Float32,    "Control loop 1 setpoint"),
    Register::new("Ctrl1Hysteresis",   74, RW, Float32,    "Control loop 1 hysteresis"),
    Register::new("Ctrl1AlarmPtLow",   76, RW, Float32,    "Control loop 1 alarm point low"),
    Register::new("Ctrl1AlarmPtHigh",  78, RW, Float32,    "Control loop 1 alarm point high"),
    Register::new("Ctrl1EnbSource",    80, RW, UInt16,     "Control loop 1 external enable source"),
    Register::new("Ctrl1MinOnTime",    81, RW, UInt16,     "Control loop 1 minimum on time in seconds").unit("s"),
    Register::new("Ctrl1Minimum",      82, R,  Float32,    "Control loop 1 minimum value measured"),
    Register::new("Ctrl1Maximum",      84, R,  Float32,    "Control loop 1 maximum value measured"),
    Register::new("Ctrl2Input",        86, RW, UInt16,     "Control loop 2 input source"),
    Register::new("Ctrl2Output",       87, RW, UInt16,     "Control loop 2 output"),
    Register::new("Ctrl2Setpoint",     88, RW, Float32,    "Control loop 2 setpoint"),
    Register::new("Ctrl2Hysteresis",   90, RW, Float32,    "Control loop 2 hysteresis"),
    Register::new("Ctrl2AlarmPtLow",   92, RW, Float32,    "Control loop 2 alarm point low"),
    Register::new("Ctrl2AlarmPtHigh",  94, RW, Float32,    "Control loop 2 alarm point high"),
    Register::new("Ctrl2EnbSource",    96, RW, UInt16,     "Control loop 2 external enable source"),
    Register::new("Ctrl2MinOnTime",    97, RW, UInt16,     "Control loop 2 minimum on time in seconds").unit("s"),
    Register::new("Ctrl2Minimum",      98, R,  Float32,    "Control loop 2 minimum value measured"),
    Register::new("Ctrl2Maximum",     100, R,  Float32,    "Control loop 2 maximum value measured"),
    Register::new("Ctrl3Input",       102, RW, UInt16,     "Control loop 3 input source"),
    Register::new("Ctrl3Output",      103, RW, UInt16,     "Control loop 3 output"),
    Register::new("Ctrl3Setpoint",    104, RW, Float32,    "Control loop 3 setpoint"),
    Register::new("Ctrl3Hysteresis",  106, RW, Float32,    "Control loop 3 hysteresis"),
    Register::new("Ctrl3AlarmPtLow",  108, RW, Float32,    "Control loop 3 alarm point low"),
    Register::new("Ctrl3AlarmPtHigh", 110, RW, Float32,    "Control loop 3 alarm point high"),
    Register::new("Ctrl3EnbSource",   112, RW, UInt16,     "Control loop 3 external enable source"),
    Register::new("Ctrl3MinOnTime",   113, RW, UInt16,     "Control loop 3 minimum on time in seconds").unit("s"),
    Register::new("Ctrl3Minimum",     114, R,  Float32,    "Control loop 3 minimum value measured"),
    Register::new("Ctrl3Maximum",     116, R,  Float32,    "Control loop 3 maximum value measured"),
    Register::new("Ctrl4Input",       118, RW, UInt16,     "Control loop 4 input source"),
    Register::new("Ctrl4Output",      119, RW, UInt16,     "Control loop 4 output"),
    Register::new("Ctrl4Setpoint",    120, RW, Float32,    "Control loop 4 setpoint"),
    Register::new("Ctrl4Hysteresis",  122, RW, Float32,    "Control loop 4 hysteresis"),
    Register::new("Ctrl4AlarmPtLow",  124, RW, Float32,    "Control loop 4 alarm point low"),
    Register::new("Ctrl4AlarmPtHigh", 126, RW, Float32,    "Control loop 4 alarm point high"),
    Register::new("Ctrl4EnbSource",   128, RW, UInt16,     "Control loop 4 external enable source"),
    Register::new("Ctrl4MinOnTime",   129, RW, UInt16,     "Control loop 4 minimum on time in seconds").unit("s"),
    Register::new("Ctrl4Minimum",     130, R,  Float32,    "Control loop 4 minimum value measured"),
    Register::new("Ctrl4Maximum",     132, R,  Float32,    "Control loop 4 maximum value measured"),
    Register::new("LogicInA",         136, RW, UInt16,     "Logic gate input A source"),
    Register::new("LogicInB",         137, RW, UInt16,     "Logic gate input B source"),
    Register::new("LogicFunction",    138, RW, UInt16,     "Logic gate function"),
    Register::new("LogicOut",         139, RW, UInt16,     "Logic gate output channel"),
    Register::new("ToDStart",         140, R,  HourMinute, "Formatted ToD start time string"),
    Register::new("ToDStartHour",     140, RW, UInt16,     "Time of day start hour").unit("h"),
    Register::new("ToDStartMin",      141, RW, UInt16,     "Time of day start minute").unit("m"),
    Register::new("ToDStop",          142, R,  HourMinute, "Formatted ToD stop time string"),
    Register::new("ToDStopHour",      142, RW, UInt16,     "Time of day stop hour").unit("h"),
    Register::new("ToDStopMin",       143, RW, UInt16,     "Time of day stop minute").unit("m"),
    Register::new("ToDOutput1",       144, RW, UInt16,     "Time of day output channel 1"),
    Register::new("ToDOutput2",       145, RW, UInt16,     "Time of day output channel 2"),
    Register::new("ToDOutput3",       146, RW, UInt16,     "Time of day output channel 3"),
    Register::new("ToDOutput4",       147, RW, UInt16,     "Time of day output channel 4"),
    Register::new("TimeLimCmdTime",   148, RW, UInt16,     "Time limited command duration"),
    Register::new("TimeLimCmdOut",    149, RW, UInt16,     "Time limited command output channel"),
    Register::new("CountSource",      150, RW, UInt16,     "Counter source channel"),
    Register::new("Counter",          151, R,  UInt32,     "Event counter"),
    Register::new("CountRstIntv",     153, RW, UInt16,     "Counter reset interval"),
    Register::new("TimerSource",      154, RW, UInt16,     "Timer source channel"),
    Register::new("Timer",            155, R,  UInt32,     "Event timer in seconds").unit("s"),
    Register::new("TimerRstIntv",     157, RW, UInt16,     "Timer reset interval"),
    Register::new("LogInterval",      160, RW, UInt16,     "Internal logging interval"),
    Register::new("LogRecords",       161, R,  UInt16,     "Number of logged records"),
    Register::new("LogNumber",        162, RW, UInt16,     "Log record number to retrieve"),
    Register::new("LogItem",          163, RW, UInt16,     "Log item to retrieve"),
    Register::new("LogData",          164, RW, Float32,    "Retrieved log data"),
    Register::new("ProcessChanA",     166, RW, UInt16,     "Data processing input A"),
    Register::new("ProcessChanB",     167, RW, UInt16,     "Data processing input B"),
    Register::new("ProcessID",        168, RW, UInt16,     "Operation to perform on processed inputs"),
    // coils
    Register::new("Status",             0, R,  Bool,       "Current controller status, True=good"),
    Register::new("NTPTimeValid",       1, R,  Bool,       "Status of last attempted NTP time synchronization"),
    Register::new("Startup",            2, R,  Bool,       "True during controller startup, no controls active"),
    Register::new("SaveSettings",       3, W,  Bool,       "save settings to EEPROM"),
    Register::new("ClearSettings",      4, W,  Bool,       "set all settings to defaults"),
    Register::new("MidnightSave",       5, RW, Bool,       "Save settings each midnight"),
    Register::new("MidnightReset",      6, RW, Bool,       "Reset controller each midnight"),
    Register::new("SilenceAlarms",      7, RW, Bool,       "Silence alarms"),
    Register::new("DigitalIn1",         8, R,  Bool,       "Digital input 1 state"),
    Register::new("DigitalIn2",         9, R,  Bool,       "Digital input 2 state"),
    Register::new("Relay1Status",      10, R,  Bool,       "Relay 1 state"),
    Register::new("Relay2Status",      11, R,  Bool,       "Relay 2 state"),
    Register::new("DigitalOut1",       12, R,  Bool,       "Digital output 1 state"),
    Register::new("DigitalOut2",       13, R,  Bool,       "Digital output 2 state"),
    Register::new("Relay1Request",     14, RW, Bool,       "Manual request for relay 1"),
    Register::new("Relay2Request",     15, RW, Bool,       "Manual request for relay 2"),
    Register::new("Dout1Request",      16, RW, Bool,       "Manual request for digital output 1"),
    Register::new("Dout2Request",      17, RW, Bool,       "Manual request for digital output 2"),
    Register::new("VirtualIO1",        18, RW, Bool,       "Virtual IO 1"),
    Register::new("VirtualIO2",        19, RW, Bool,       "Virtual IO 2"),
    Register::new("WQSensorValid",     20, R,  Bool,       "Water quality reading is valid"),
    Register::new("Temp1Valid",        21, R,  Bool,       "Temperature sensor 1 reading is valid"),
    Register::new("Temp2Valid",        22, R,  Bool,       "Temperature sensor 2 reading is valid"),
    Register::new("Analog1Valid",      23, R,  Bool,       "Analog input 1 reading is valid"),
    Register::new("Analog2Valid",      24, R,  Bool,       "Analog input 2 reading is valid"),
    Register::new("LocalTempValid",    25, R,  Bool,       "Internal temperature reading is valid"),
    Register::new("SupVoltValid",      26, R,  Bool,       "Supply voltage reading is valid"),
    Register::new("ProcReadValid",     27, R,  Bool,       "Processed data is valid"),
    Register::new("LogicGateResult",   28, R,  Bool,       "Logic gate output"),
    Register::new("Flash",             29, R,  Bool,       "One second flasher"),
    Register::new("Ctrl1Enable",       30, RW, Bool,       "Enable control loop 1"),
    Register::new("Ctrl2Enable",       31, RW, Bool,       "Enable control loop 2"),
    Register::new("Ctrl3Enable",       32, RW, Bool,       "Enable control loop 3"),
    Register::new("Ctrl4Enable",       33, RW, Bool,       "Enable control loop 4"),
    Register::new("Ctrl1High",         34, RW, Bool,       "Control loop 1 acts on high values"),
    Register::new("Ctrl2High",         35, RW, Bool,       "Control loop 2 acts on high values"),
    Register::new("Ctrl3High",         36, RW, Bool,       "Control loop 3 acts on high values"),
    Register::new("Ctrl4High",         37, RW, Bool,       "Control loop 4 acts on high values"),
    Register::new("Ctrl1Active",       38, R,  Bool,       "Control loop 1 output active"),
    Register::new("Ctrl2Active",       39, R,  Bool,       "Control loop 2 output active"),
    Register::new("Ctrl3Active",       40, R,  Bool,       "Control loop 3 output active"),
    Register::new("Ctrl4Active",       41, R,  Bool,       "Control loop 4 output active"),
    Register::new("CtrlAlarm",         42, R,  Bool,       "Control loop alarm"),
    Register::new("Ctrl1Alarm",        43, R,  Bool,       "Control loop 1 alarm"),
    Register::new("Ctrl2Alarm",        44, R,  Bool,       "Control loop 2 alarm"),
    Register::new("Ctrl3Alarm",        45, R,  Bool,       "Control loop 3 alarm"),
    Register::new("Ctrl4Alarm",        46, R,  Bool,       "Control loop 4 alarm"),
    Register::new("Ctrl1AlarmLow",     47, R,  Bool,       "Control loop 1 alarm low"),
    Register::new("Ctrl2AlarmLow",     48, R,  Bool,       "Control loop 2 alarm low"),
    Register::new("Ctrl3AlarmLow",     49, R,  Bool,       "Control loop 3 alarm low"),
    Register::new("Ctrl4AlarmLow",     50, R,  Bool,       "Control loop 4 alarm low"),
    Register::new("Ctrl1AlarmHigh",    51, R,  Bool,       "Control loop 1 alarm high"),
    Register::new("Ctrl2AlarmHigh",    52, R,  Bool,       "Control loop 2 alarm high"),
    Register::new("Ctrl3AlarmHigh",    53, R,  Bool,       "Control loop 3 alarm high"),
    Register::new("Ctrl4AlarmHigh",    54, R,  Bool,       "Control loop 4 alarm high"),
    Register::new("RstCtrl1Max",       55, W,  Bool,       "Reset control loop 1 minimum and maximum"),
    Register::new("RstCtrl2Max",       56, W,  Bool,       "Reset control loop 2 minimum and maximum"),
    Register::new("RstCtrl3Max",       57, W,  Bool,       "Reset control loop 3 minimum and maximum"),
    Register::new("RstCtrl4Max",       58, W,  Bool,       "Reset control loop 4 minimum and maximum"),
    Register::new("CounterEnable",     59, RW, Bool,       "Enable event counter"),
    Register::new("TimerEnable",       60, RW, Bool,       "Enable event timer"),
    Register::new("ToDEnable",         61, RW, Bool,       "Enable time of day function"),
    Register::new("ToDActive",         62, R,  Bool,       "Time of day is active"),
    Register::new("ResetCounter",      63, W,  Bool,       "Write True to reset event counter"),
    Register::new("ResetTimer",        64, W,  Bool,       "Write True to reset event timer"),
    Register::new("ResetLogging",      65, W,  Bool,       "Write True to reset internal logging"),
    Register::new("statCtrl1OneShot",  66, RW, Bool,       "Control loop 1 one-shot mode"),
    Register::new("statCtrl2OneShot",  67, RW, Bool,       "Control loop 2 one-shot mode"),
    Register::new("statCtrl3OneShot",  68, RW, Bool,       "Control loop 3 one-shot mode"),
    Register::new("statCtrl4OneShot",  69, RW, Bool,       "Control loop 4 one-shot mode"),
    Register::new("TimeLimitedCmd",    70, RW, Bool,       "Time limited command input"),
];

/// Unit strings indexed by unit code
pub static UNITS: [&str; 33] = [
    "None", "°C", "°F", "pH", "mV", "V", "mA", "A", "mm", "m", "ml", "l", "g", "kg", "lbs", "kPa",
    "PSI", "Hz", "%", "ppm", "Ω", "day", "hr", "min", "sec", "mol", "mph", "m/s", "°", "mmHg",
    "mBar", "kW", "kVA",
];

/// Operations available to the data processing block
pub static PROCESSES: [&str; 6] = [
    "Average",
    "Minimum",
    "Maximum",
    "Sum",
    "Difference",
    "Priority",
];

/// Source channels selectable for controls, indexed by channel code
pub static CHANNELS: [&str; 40] = [
    "None", "WQSensor", "Temperature1", "Temperature2", "Analog1", "Analog2",
    "InternalTemp", "SupplyVoltage", "ProcessedData",
    "DigitalIn1", "DigitalIn2", "Relay1Status", "Relay2Status", "DigitalOut1", "DigitalOut2",
    "VirtualIO1", "VirtualIO2",
    "Ctrl1Active", "Ctrl2Active", "Ctrl3Active", "Ctrl4Active",
    "CtrlAlarm", "Ctrl1Alarm", "Ctrl2Alarm", "Ctrl3Alarm", "Ctrl4Alarm",
    "Ctrl1AlarmLow", "Ctrl2AlarmLow", "Ctrl3AlarmLow", "Ctrl4AlarmLow",
    "Ctrl1AlarmHigh", "Ctrl2AlarmHigh", "Ctrl3AlarmHigh", "Ctrl4AlarmHigh",
    "Flasher", "Day", "Hour", "Minute", "Second", "TofD",
];

/// Display names matching [`CHANNELS`]
pub static CHANNEL_NAMES: [&str; 40] = [
    "None", "WQ Amplifier", "Temperature 1", "Temperature 2", "Analog 1", "Analog 2",
    "Internal Temp", "Supply Voltage", "Processed",
    "Digital In 1", "Digital In 2", "Relay 1", "Relay 2", "Digital Out 1", "Digital Out 2",
    "Virtual IO 1", "Virtual IO 2",
    "Control 1 Out", "Control 2 Out", "Control 3 Out", "Control 4 Out",
    "Control Alarm", "Control 1 Alarm", "Control 2 Alarm", "Control 3 Alarm", "Control 4 Alarm",
    "Control 1 Alarm Low", "Control 2 Alarm Low", "Control 3 Alarm Low", "Control 4 Alarm Low",
    "Control 1 Alarm High", "Control 2 Alarm High", "Control 3 Alarm High", "Control 4 Alarm High",
    "Flasher", "Days", "Hours", "Minutes", "Seconds", "Time of Day",
];
